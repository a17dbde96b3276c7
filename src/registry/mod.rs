//! Unit Registry
//!
//! Push-model discovery: units register themselves (with their priority)
//! when they are constructed, and the scheduler takes one snapshot of the
//! live set when its pass starts.
//!
//! The registry never owns units. It holds weak references, so a unit whose
//! owner has dropped it is simply absent from the next discovery.

pub mod unit_registry;

pub use unit_registry::{DiscoveredUnit, UnitHandle, UnitRef, UnitRegistry, DEFAULT_SCOPE};
