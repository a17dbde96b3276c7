//! Core primitives.
//!
//! The unit contract and priority metadata, plus order hashing used to
//! verify that ordering never depends on registration order.

pub mod priority;
pub mod unit;
pub mod hash;

// Re-export core types
pub use priority::Priority;
pub use unit::{Initializable, InitOnce, UnitDescriptor};
pub use hash::{fingerprint_order, OrderFingerprint};
