//! Initializable Units
//!
//! The contract a component implements to receive one ordered
//! startup call, plus the metadata the scheduler sorts on.

use serde::{Deserialize, Serialize};

use super::priority::Priority;
use crate::error::InitError;

/// A component that needs controlled, ordered startup.
///
/// The scheduler calls [`initialize`](Initializable::initialize) at most
/// once per pass. Nothing stops other code from calling it again; embed an
/// [`InitOnce`] if that has to be a no-op.
pub trait Initializable {
    /// Perform one-shot startup work.
    ///
    /// An `Err` is caught by the scheduler, reported, and the pass moves on.
    fn initialize(&mut self) -> Result<(), InitError>;
}

/// Metadata recorded for a unit at registration time.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct UnitDescriptor {
    /// Registration sequence number (unique within a registry).
    pub seq: u64,
    /// Instance name, used as a tie-break key.
    pub name: String,
    /// Concrete type of the unit (`std::any::type_name`).
    pub type_name: String,
    /// Declared priority.
    pub priority: Priority,
    /// Whether the unit was active at discovery.
    pub active: bool,
}

impl UnitDescriptor {
    /// Short label for logs: `name (type)`.
    pub fn label(&self) -> String {
        let short_type = self.type_name.rsplit("::").next().unwrap_or(&self.type_name);
        format!("{} ({})", self.name, short_type)
    }
}

/// Guard for implementers who want `initialize()` to be idempotent.
///
/// ```
/// use startup_scheduler::core::unit::InitOnce;
///
/// let mut once = InitOnce::new();
/// let mut calls = 0;
/// assert!(once.run(|| { calls += 1; Ok(()) }).unwrap());
/// assert!(!once.run(|| { calls += 1; Ok(()) }).unwrap());
/// assert_eq!(calls, 1);
/// ```
#[derive(Clone, Copy, Debug, Default)]
pub struct InitOnce {
    done: bool,
}

impl InitOnce {
    /// Create an unfired guard.
    pub const fn new() -> Self {
        Self { done: false }
    }

    /// Has the guarded body already run (successfully or not)?
    pub fn is_done(&self) -> bool {
        self.done
    }

    /// Run `f` the first time only.
    ///
    /// Returns `Ok(true)` if `f` ran and succeeded, `Ok(false)` if it was
    /// skipped. A failed attempt still consumes the guard: units get one try.
    pub fn run<F>(&mut self, f: F) -> Result<bool, InitError>
    where
        F: FnOnce() -> Result<(), InitError>,
    {
        if self.done {
            return Ok(false);
        }
        self.done = true;
        f().map(|()| true)
    }
}
