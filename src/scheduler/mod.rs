//! Initialization Scheduler
//!
//! ## Module Structure
//!
//! - `order`: ordering pairs, tie-break policy, the sort
//! - `pass`: the scheduler state machine and invocation loop
//! - `report`: serializable pass reports
//! - `reporter`: failure reporting collaborators

pub mod order;
pub mod pass;
pub mod report;
pub mod reporter;

// Re-export key types
pub use order::{compute_order, OrderingPair, TieBreak};
pub use pass::{Scheduler, SchedulerState};
pub use report::{InvocationOutcome, InvocationRecord, PassOutcome, PassReport};
pub use reporter::{CollectingReporter, FailureReporter, ReportedFailure, TracingReporter};
