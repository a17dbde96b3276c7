//! # Startup Scheduler
//!
//! Deterministic, priority-ordered, one-shot initialization of components.
//!
//! ## Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────┐
//! │                    STARTUP SCHEDULER                         │
//! ├─────────────────────────────────────────────────────────────┤
//! │  core/           - Contract and deterministic primitives     │
//! │  ├── unit.rs     - Initializable trait, InitOnce guard       │
//! │  ├── priority.rs - Priority metadata (higher runs first)     │
//! │  └── hash.rs     - Invocation order fingerprints             │
//! │                                                              │
//! │  registry/       - Push-model unit discovery                 │
//! │  └── unit_registry.rs - Weak-reference registry, snapshots   │
//! │                                                              │
//! │  scheduler/      - The initialization pass                   │
//! │  ├── order.rs    - Priority / tie-break sort                 │
//! │  ├── pass.rs     - State machine and invocation loop         │
//! │  ├── report.rs   - Pass reports                              │
//! │  └── reporter.rs - Failure reporting collaborators           │
//! │                                                              │
//! │  host.rs         - Bootstrap: pass before first frame        │
//! │  config.rs       - Configuration (defaults + env)            │
//! │  error.rs        - Error types                               │
//! └─────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Determinism Guarantee
//!
//! For a fixed set of units the invocation order is fixed:
//! - priority descending
//! - then tie-break key ascending (name, or type then name)
//! - then registration sequence ascending
//!
//! Registration order never changes the result unless keys collide
//! exactly, and the resulting order can be compared across runs through
//! its fingerprint.
//!
//! ## Usage
//!
//! ```
//! use std::cell::RefCell;
//! use std::rc::Rc;
//! use startup_scheduler::{Bootstrap, Initializable, InitError, SchedulerConfig};
//!
//! struct ConfigLoader { loaded: bool }
//!
//! impl Initializable for ConfigLoader {
//!     fn initialize(&mut self) -> Result<(), InitError> {
//!         self.loaded = true;
//!         Ok(())
//!     }
//! }
//!
//! let loader = Rc::new(RefCell::new(ConfigLoader { loaded: false }));
//!
//! let mut host = Bootstrap::new(SchedulerConfig::default());
//! host.registry_mut().register("ConfigLoader", 1000, &loader);
//! host.start();
//!
//! assert!(loader.borrow().loaded);
//! ```

#![warn(missing_docs)]
#![warn(clippy::all)]
#![deny(unsafe_code)]

pub mod config;
pub mod core;
pub mod error;
pub mod host;
pub mod registry;
pub mod scheduler;

// Re-export commonly used types
pub use crate::core::priority::Priority;
pub use crate::core::unit::{Initializable, InitOnce, UnitDescriptor};
pub use config::SchedulerConfig;
pub use error::{ConfigError, InitError};
pub use host::{Bootstrap, FrameHook};
pub use registry::{UnitHandle, UnitRegistry};
pub use scheduler::{PassOutcome, PassReport, Scheduler, SchedulerState, TieBreak};

/// Crate version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
