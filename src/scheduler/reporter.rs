//! Failure Reporting
//!
//! The scheduler only needs `report(unit, error)`. Where the report goes
//! (logs, an error tracker, a test buffer) is the host's business.

use std::cell::RefCell;
use std::rc::Rc;

use tracing::error;

use crate::core::unit::UnitDescriptor;
use crate::error::InitError;

/// Receives one call per failed `initialize()`.
pub trait FailureReporter {
    /// Report a unit failure.
    fn report(&self, unit: &UnitDescriptor, error: &InitError);
}

/// Emits failures as structured `tracing` errors.
#[derive(Clone, Copy, Debug, Default)]
pub struct TracingReporter;

impl FailureReporter for TracingReporter {
    fn report(&self, unit: &UnitDescriptor, err: &InitError) {
        error!(
            unit = %unit.name,
            unit_type = %unit.type_name,
            priority = %unit.priority,
            seq = unit.seq,
            error = %err,
            "unit failed to initialize"
        );
    }
}

/// A failure captured by [`CollectingReporter`].
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ReportedFailure {
    /// Unit that failed.
    pub unit: UnitDescriptor,
    /// Rendered error.
    pub message: String,
}

/// Keeps failures in memory. Clones share the same buffer.
#[derive(Clone, Debug, Default)]
pub struct CollectingReporter {
    failures: Rc<RefCell<Vec<ReportedFailure>>>,
}

impl CollectingReporter {
    /// Create an empty collector.
    pub fn new() -> Self {
        Self::default()
    }

    /// Snapshot of everything reported so far.
    pub fn failures(&self) -> Vec<ReportedFailure> {
        self.failures.borrow().clone()
    }

    /// Number of reports received.
    pub fn len(&self) -> usize {
        self.failures.borrow().len()
    }

    /// Nothing reported?
    pub fn is_empty(&self) -> bool {
        self.failures.borrow().is_empty()
    }
}

impl FailureReporter for CollectingReporter {
    fn report(&self, unit: &UnitDescriptor, err: &InitError) {
        self.failures.borrow_mut().push(ReportedFailure {
            unit: unit.clone(),
            message: err.to_string(),
        });
    }
}

/// Fans a report out to several reporters.
impl<A: FailureReporter, B: FailureReporter> FailureReporter for (A, B) {
    fn report(&self, unit: &UnitDescriptor, err: &InitError) {
        self.0.report(unit, err);
        self.1.report(unit, err);
    }
}

impl<R: FailureReporter + ?Sized> FailureReporter for Box<R> {
    fn report(&self, unit: &UnitDescriptor, err: &InitError) {
        (**self).report(unit, err);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::priority::Priority;

    fn desc(name: &str) -> UnitDescriptor {
        UnitDescriptor {
            seq: 0,
            name: name.into(),
            type_name: "T".into(),
            priority: Priority::DEFAULT,
            active: true,
        }
    }

    #[test]
    fn test_collecting_reporter_shares_buffer() {
        let reporter = CollectingReporter::new();
        let handle = reporter.clone();

        reporter.report(&desc("X"), &InitError::failed("boom"));

        assert_eq!(handle.len(), 1);
        assert_eq!(handle.failures()[0].unit.name, "X");
        assert_eq!(handle.failures()[0].message, "initialization failed: boom");
    }

    #[test]
    fn test_pair_reports_to_both() {
        let a = CollectingReporter::new();
        let b = CollectingReporter::new();
        let pair = (a.clone(), b.clone());

        pair.report(&desc("Y"), &InitError::Busy);

        assert_eq!(a.len(), 1);
        assert_eq!(b.len(), 1);
    }
}
