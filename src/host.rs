//! Host Integration
//!
//! `Bootstrap` is the explicit replacement for a global scheduler singleton
//! with an "earliest execution order" attribute: the host builds one, lets
//! units register into its registry, and drives frames through it. The
//! initialization pass always runs before the first frame hook.

use std::cell::RefCell;
use std::rc::{Rc, Weak};

use tracing::{debug, warn};

use crate::config::SchedulerConfig;
use crate::registry::UnitRegistry;
use crate::scheduler::pass::Scheduler;
use crate::scheduler::report::{PassOutcome, PassReport};
use crate::scheduler::reporter::{FailureReporter, TracingReporter};

/// Per-frame logic that must only run after startup.
pub trait FrameHook {
    /// Called once per frame, starting at frame 1.
    fn update(&mut self, frame: u64);
}

struct HookEntry {
    name: String,
    hook: Weak<RefCell<dyn FrameHook>>,
}

/// Owns the scheduler and registry for one scope.
pub struct Bootstrap<R: FailureReporter = TracingReporter> {
    scheduler: Scheduler<R>,
    registry: UnitRegistry,
    hooks: Vec<HookEntry>,
    frame: u64,
    report: Option<PassReport>,
}

impl Bootstrap<TracingReporter> {
    /// Create a bootstrap that logs unit failures through `tracing`.
    pub fn new(config: SchedulerConfig) -> Self {
        Self::with_reporter(config, TracingReporter)
    }
}

impl<R: FailureReporter> Bootstrap<R> {
    /// Create a bootstrap with a custom failure reporter.
    pub fn with_reporter(config: SchedulerConfig, reporter: R) -> Self {
        let registry = UnitRegistry::new(config.scope.clone());
        Self {
            scheduler: Scheduler::with_reporter(config, reporter),
            registry,
            hooks: Vec::new(),
            frame: 0,
            report: None,
        }
    }

    /// Registry units register into.
    pub fn registry(&self) -> &UnitRegistry {
        &self.registry
    }

    /// Mutable registry access for registration.
    pub fn registry_mut(&mut self) -> &mut UnitRegistry {
        &mut self.registry
    }

    /// The owned scheduler.
    pub fn scheduler(&self) -> &Scheduler<R> {
        &self.scheduler
    }

    /// Add per-frame logic. Hooks run in the order they were added.
    pub fn add_frame_hook<H>(&mut self, name: impl Into<String>, hook: &Rc<RefCell<H>>)
    where
        H: FrameHook + 'static,
    {
        let hook: Rc<RefCell<dyn FrameHook>> = hook.clone();
        self.hooks.push(HookEntry {
            name: name.into(),
            hook: Rc::downgrade(&hook),
        });
    }

    /// Run the initialization pass if it has not run yet.
    ///
    /// Returns the report of the pass (from this call or an earlier one).
    pub fn start(&mut self) -> Option<&PassReport> {
        match self.scheduler.run_initialization(&self.registry) {
            PassOutcome::Completed(report) => self.report = Some(report),
            PassOutcome::AlreadyInitialized => {}
        }
        self.report.as_ref()
    }

    /// Advance one frame, starting the scheduler first if needed.
    ///
    /// Returns the frame number just run.
    pub fn tick(&mut self) -> u64 {
        if !self.scheduler.is_initialized() {
            debug!("first tick before start, running initialization pass");
            self.start();
        }

        self.frame += 1;
        let frame = self.frame;

        self.hooks.retain(|entry| entry.hook.strong_count() > 0);
        for entry in &self.hooks {
            let Some(hook) = entry.hook.upgrade() else {
                continue;
            };
            match hook.try_borrow_mut() {
                Ok(mut hook) => hook.update(frame),
                Err(_) => warn!(hook = %entry.name, frame, "frame hook busy, skipped"),
            };
        }

        frame
    }

    /// Last frame number run (0 before the first tick).
    pub fn frame(&self) -> u64 {
        self.frame
    }

    /// Report of the initialization pass, once it has run.
    pub fn report(&self) -> Option<&PassReport> {
        self.report.as_ref()
    }
}
