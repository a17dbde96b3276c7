//! Registration and snapshot discovery.

use std::cell::RefCell;
use std::rc::{Rc, Weak};

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::core::priority::Priority;
use crate::core::unit::{Initializable, UnitDescriptor};

/// Scope name used when none is configured.
pub const DEFAULT_SCOPE: &str = "default";

/// Shared, interior-mutable reference to a unit.
///
/// Units are owned by the host; the registry and the scheduler only borrow.
pub type UnitRef = Rc<RefCell<dyn Initializable>>;

/// Opaque handle returned by registration.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct UnitHandle(u64);

impl UnitHandle {
    /// Registration sequence number behind this handle.
    pub fn seq(&self) -> u64 {
        self.0
    }
}

/// A live unit captured by [`UnitRegistry::discover`].
pub struct DiscoveredUnit {
    /// Metadata at the time of discovery.
    pub descriptor: UnitDescriptor,
    /// Strong reference, held for the duration of the pass.
    pub unit: UnitRef,
}

impl std::fmt::Debug for DiscoveredUnit {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("DiscoveredUnit")
            .field("descriptor", &self.descriptor)
            .finish_non_exhaustive()
    }
}

struct RegistryEntry {
    descriptor: UnitDescriptor,
    unit: Weak<RefCell<dyn Initializable>>,
}

/// Registry of initializable units within one discovery scope.
pub struct UnitRegistry {
    scope: String,
    entries: Vec<RegistryEntry>,
    next_seq: u64,
}

impl Default for UnitRegistry {
    fn default() -> Self {
        Self::new(DEFAULT_SCOPE)
    }
}

impl UnitRegistry {
    /// Create an empty registry for `scope`.
    pub fn new(scope: impl Into<String>) -> Self {
        Self {
            scope: scope.into(),
            entries: Vec::new(),
            next_seq: 0,
        }
    }

    /// Scope this registry enumerates.
    pub fn scope(&self) -> &str {
        &self.scope
    }

    /// Register a unit with its declared priority.
    ///
    /// The type name is captured from `U` and can serve as the tie-break key
    /// when the scheduler is configured for type identity.
    pub fn register<U>(
        &mut self,
        name: impl Into<String>,
        priority: impl Into<Priority>,
        unit: &Rc<RefCell<U>>,
    ) -> UnitHandle
    where
        U: Initializable + 'static,
    {
        let unit: UnitRef = unit.clone();
        self.register_dyn(name, priority, std::any::type_name::<U>(), &unit)
    }

    /// Register an already type-erased unit.
    pub fn register_dyn(
        &mut self,
        name: impl Into<String>,
        priority: impl Into<Priority>,
        type_name: impl Into<String>,
        unit: &UnitRef,
    ) -> UnitHandle {
        let seq = self.next_seq;
        self.next_seq += 1;

        let descriptor = UnitDescriptor {
            seq,
            name: name.into(),
            type_name: type_name.into(),
            priority: priority.into(),
            active: true,
        };

        debug!(
            scope = %self.scope,
            seq,
            unit = %descriptor.label(),
            priority = %descriptor.priority,
            "registered unit"
        );

        self.entries.push(RegistryEntry {
            descriptor,
            unit: Rc::downgrade(unit),
        });

        UnitHandle(seq)
    }

    /// Mark a unit active or inactive. Returns false for unknown handles.
    ///
    /// Inactive units are still discovered.
    pub fn set_active(&mut self, handle: UnitHandle, active: bool) -> bool {
        match self.entry_mut(handle) {
            Some(entry) => {
                entry.descriptor.active = active;
                true
            }
            None => false,
        }
    }

    /// Remove a registration. Returns false for unknown handles.
    pub fn unregister(&mut self, handle: UnitHandle) -> bool {
        let before = self.entries.len();
        self.entries.retain(|e| e.descriptor.seq != handle.0);
        self.entries.len() != before
    }

    /// Metadata for a registration, if it still exists.
    pub fn descriptor(&self, handle: UnitHandle) -> Option<&UnitDescriptor> {
        self.entries
            .iter()
            .find(|e| e.descriptor.seq == handle.0)
            .map(|e| &e.descriptor)
    }

    /// Snapshot every live unit in scope, inactive ones included.
    ///
    /// Order follows registration and carries no meaning; the scheduler
    /// imposes its own.
    pub fn discover(&self) -> Vec<DiscoveredUnit> {
        let snapshot: Vec<DiscoveredUnit> = self
            .entries
            .iter()
            .filter_map(|entry| {
                entry.unit.upgrade().map(|unit| DiscoveredUnit {
                    descriptor: entry.descriptor.clone(),
                    unit,
                })
            })
            .collect();

        debug!(
            scope = %self.scope,
            live = snapshot.len(),
            registered = self.entries.len(),
            "discovery snapshot"
        );

        snapshot
    }

    /// Drop registrations whose unit has been destroyed. Returns how many.
    pub fn prune(&mut self) -> usize {
        let before = self.entries.len();
        self.entries.retain(|e| e.unit.strong_count() > 0);
        before - self.entries.len()
    }

    /// Number of registrations (live or not).
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// No registrations at all?
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Number of registrations whose unit is still alive.
    pub fn live_count(&self) -> usize {
        self.entries
            .iter()
            .filter(|e| e.unit.strong_count() > 0)
            .count()
    }

    fn entry_mut(&mut self, handle: UnitHandle) -> Option<&mut RegistryEntry> {
        self.entries.iter_mut().find(|e| e.descriptor.seq == handle.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::InitError;

    struct Noop;

    impl Initializable for Noop {
        fn initialize(&mut self) -> Result<(), InitError> {
            Ok(())
        }
    }

    fn noop() -> Rc<RefCell<Noop>> {
        Rc::new(RefCell::new(Noop))
    }

    #[test]
    fn test_register_records_metadata() {
        let mut registry = UnitRegistry::new("scene");
        let unit = noop();
        let handle = registry.register("Loader", 10, &unit);

        let desc = registry.descriptor(handle).unwrap();
        assert_eq!(desc.name, "Loader");
        assert_eq!(desc.priority, Priority(10));
        assert!(desc.type_name.ends_with("Noop"));
        assert!(desc.active);
        assert_eq!(registry.scope(), "scene");
    }

    #[test]
    fn test_handles_are_sequential() {
        let mut registry = UnitRegistry::default();
        let a = noop();
        let b = noop();
        let h1 = registry.register("A", 0, &a);
        let h2 = registry.register("B", 0, &b);
        assert_eq!(h1.seq() + 1, h2.seq());
    }

    #[test]
    fn test_discover_includes_inactive() {
        let mut registry = UnitRegistry::default();
        let a = noop();
        let b = noop();
        registry.register("A", 0, &a);
        let hb = registry.register("B", 0, &b);
        assert!(registry.set_active(hb, false));

        let found = registry.discover();
        assert_eq!(found.len(), 2);
        assert!(!found[1].descriptor.active);
    }

    #[test]
    fn test_dropped_units_not_discovered() {
        let mut registry = UnitRegistry::default();
        let a = noop();
        let b = noop();
        registry.register("A", 0, &a);
        registry.register("B", 0, &b);

        drop(b);
        assert_eq!(registry.discover().len(), 1);
        assert_eq!(registry.live_count(), 1);
        assert_eq!(registry.len(), 2);

        assert_eq!(registry.prune(), 1);
        assert_eq!(registry.len(), 1);
    }

    #[test]
    fn test_snapshot_excludes_later_registrations() {
        let mut registry = UnitRegistry::default();
        let a = noop();
        registry.register("A", 0, &a);

        let snapshot = registry.discover();

        let b = noop();
        registry.register("B", 0, &b);

        assert_eq!(snapshot.len(), 1);
        assert_eq!(registry.discover().len(), 2);
    }

    #[test]
    fn test_unregister() {
        let mut registry = UnitRegistry::default();
        let a = noop();
        let h = registry.register("A", 0, &a);

        assert!(registry.unregister(h));
        assert!(!registry.unregister(h));
        assert!(!registry.set_active(h, false));
        assert!(registry.is_empty());
    }

    #[test]
    fn test_empty_registry() {
        let registry = UnitRegistry::default();
        assert!(registry.discover().is_empty());
        assert_eq!(registry.scope(), DEFAULT_SCOPE);
    }
}
