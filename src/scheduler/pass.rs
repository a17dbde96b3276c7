//! Initialization Pass
//!
//! The scheduler: discover → order → invoke, once.
//!
//! # Preconditions
//!
//! Startup is single-threaded. The `Uninitialized → Running` check is a plain
//! state comparison, and units are shared through `Rc<RefCell<_>>`, so the
//! whole pass is confined to the thread that owns the registry.
//!
//! # Failure isolation
//!
//! A unit that returns `Err`, panics, or is already borrowed when its turn
//! comes is reported and skipped; every other unit still gets its call and
//! the scheduler always ends in `Initialized`. With `catch_panics` off, the
//! first unit panic is re-raised, but only after the pass has completed.

use std::any::Any;
use std::cell::Cell;
use std::panic::{self, AssertUnwindSafe};
use std::time::{Duration, Instant};

use chrono::Utc;
use serde::{Deserialize, Serialize};
use tracing::{debug, info, info_span, warn};

use crate::config::SchedulerConfig;
use crate::error::InitError;
use crate::registry::UnitRegistry;
use crate::scheduler::order::{compute_order, OrderingPair};
use crate::scheduler::report::{InvocationOutcome, InvocationRecord, PassOutcome, PassReport};
use crate::scheduler::reporter::{FailureReporter, TracingReporter};

/// Scheduler lifecycle.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum SchedulerState {
    /// Created, pass not started.
    Uninitialized,
    /// Pass in progress.
    Running,
    /// Pass finished. Terminal.
    Initialized,
}

/// Priority-ordered one-shot startup scheduler.
///
/// The discovery scope reported in spans and [`PassReport`]s is the
/// registry's. `SchedulerConfig::scope` only names the registry that
/// [`Bootstrap`](crate::host::Bootstrap) creates; a mismatch is logged.
pub struct Scheduler<R: FailureReporter = TracingReporter> {
    config: SchedulerConfig,
    reporter: R,
    state: Cell<SchedulerState>,
}

/// Moves the scheduler to `Initialized` when dropped, unwinding included.
struct FinishGuard<'a> {
    state: &'a Cell<SchedulerState>,
}

impl Drop for FinishGuard<'_> {
    fn drop(&mut self) {
        self.state.set(SchedulerState::Initialized);
    }
}

/// Why a single invocation did not succeed.
enum Failure {
    Error(InitError),
    Panic(Box<dyn Any + Send>),
}

impl Scheduler<TracingReporter> {
    /// Create a scheduler that reports failures through `tracing`.
    pub fn new(config: SchedulerConfig) -> Self {
        Self::with_reporter(config, TracingReporter)
    }
}

impl Default for Scheduler<TracingReporter> {
    fn default() -> Self {
        Self::new(SchedulerConfig::default())
    }
}

impl<R: FailureReporter> Scheduler<R> {
    /// Create a scheduler with a custom failure reporter.
    pub fn with_reporter(config: SchedulerConfig, reporter: R) -> Self {
        Self {
            config,
            reporter,
            state: Cell::new(SchedulerState::Uninitialized),
        }
    }

    /// Current lifecycle state.
    pub fn state(&self) -> SchedulerState {
        self.state.get()
    }

    /// Has the pass completed?
    pub fn is_initialized(&self) -> bool {
        self.state.get() == SchedulerState::Initialized
    }

    /// Active configuration.
    pub fn config(&self) -> &SchedulerConfig {
        &self.config
    }

    /// Failure reporter.
    pub fn reporter(&self) -> &R {
        &self.reporter
    }

    /// Run the initialization pass over `registry`.
    ///
    /// The first call discovers every live unit, sorts by priority
    /// (descending) and tie-break key (ascending), and calls `initialize()`
    /// on each exactly once. Every later call is a no-op returning
    /// [`PassOutcome::AlreadyInitialized`].
    ///
    /// # Panics
    ///
    /// Only with `catch_panics` disabled: the first panic raised by a unit is
    /// resumed after every unit has been invoked and the state is
    /// `Initialized`.
    pub fn run_initialization(&mut self, registry: &UnitRegistry) -> PassOutcome {
        if self.state.get() != SchedulerState::Uninitialized {
            debug!(state = ?self.state.get(), "initialization pass already ran, ignoring");
            return PassOutcome::AlreadyInitialized;
        }
        self.state.set(SchedulerState::Running);
        let guard = FinishGuard { state: &self.state };

        let span = info_span!("init_pass", scope = %registry.scope());
        let _enter = span.enter();

        if self.config.scope != registry.scope() {
            warn!(
                configured = %self.config.scope,
                registry = %registry.scope(),
                "configured scope differs from registry scope, reporting registry scope"
            );
        }

        let started_at = Utc::now();
        let snapshot = registry.discover();
        let order = compute_order(snapshot, self.config.tie_break);

        #[cfg(feature = "debug-tracing")]
        for (position, pair) in order.iter().enumerate() {
            tracing::trace!(
                position,
                seq = pair.descriptor().seq,
                unit = %pair.descriptor().label(),
                priority = %pair.priority,
                "planned invocation"
            );
        }

        let mut invocations = Vec::with_capacity(order.len());
        let mut deferred_panic: Option<Box<dyn Any + Send>> = None;

        for (position, pair) in order.into_iter().enumerate() {
            let start = Instant::now();
            let result = self.invoke(&pair);
            let elapsed_micros = duration_micros(start.elapsed());

            let outcome = match result {
                Ok(()) => {
                    debug!(
                        position,
                        unit = %pair.descriptor().label(),
                        priority = %pair.priority,
                        elapsed_micros,
                        "unit initialized"
                    );
                    InvocationOutcome::Succeeded
                }
                Err(failure) => {
                    let err = match failure {
                        Failure::Error(err) => err,
                        Failure::Panic(payload) => {
                            let err = InitError::Panicked(panic_message(&*payload));
                            if !self.config.catch_panics && deferred_panic.is_none() {
                                deferred_panic = Some(payload);
                            }
                            err
                        }
                    };
                    self.reporter.report(pair.descriptor(), &err);
                    InvocationOutcome::Failed(err.to_string())
                }
            };

            invocations.push(InvocationRecord {
                position,
                unit: pair.unit.descriptor,
                outcome,
                elapsed_micros,
            });
        }

        drop(guard);

        let report = PassReport::new(registry.scope().to_string(), started_at, invocations);
        if report.failure_count() > 0 {
            warn!(
                units = report.unit_count(),
                failures = report.failure_count(),
                "initialization pass completed with failures"
            );
        }
        info!(
            units = report.unit_count(),
            failures = report.failure_count(),
            fingerprint = %report.fingerprint_hex(),
            "initialization pass complete"
        );

        if let Some(payload) = deferred_panic {
            warn!("re-raising unit panic (catch_panics disabled)");
            panic::resume_unwind(payload);
        }

        PassOutcome::Completed(report)
    }

    fn invoke(&self, pair: &OrderingPair) -> Result<(), Failure> {
        let mut unit = pair
            .unit
            .unit
            .try_borrow_mut()
            .map_err(|_| Failure::Error(InitError::Busy))?;

        match panic::catch_unwind(AssertUnwindSafe(|| unit.initialize())) {
            Ok(result) => result.map_err(Failure::Error),
            Err(payload) => Err(Failure::Panic(payload)),
        }
    }
}

/// Microseconds in `elapsed`, saturating at `u64::MAX`.
fn duration_micros(elapsed: Duration) -> u64 {
    u64::try_from(elapsed.as_micros()).unwrap_or(u64::MAX)
}

fn panic_message(payload: &(dyn Any + Send)) -> String {
    if let Some(msg) = payload.downcast_ref::<&str>() {
        (*msg).to_string()
    } else if let Some(msg) = payload.downcast_ref::<String>() {
        msg.clone()
    } else {
        "non-string panic payload".to_string()
    }
}

// =============================================================================
// TESTS
// =============================================================================
