//! Startup Priority
//!
//! Integer metadata controlling relative startup order.
//! Higher values run earlier; undeclared priority is 0.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Startup priority of an initializable unit.
///
/// Ordering is the natural integer ordering. The scheduler sorts
/// **descending**, so `Priority(10)` runs before `Priority(0)`.
#[derive(
    Clone, Copy, Debug, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
)]
#[serde(transparent)]
pub struct Priority(pub i32);

impl Priority {
    /// Foundational systems (configuration loaders, service locators).
    pub const FOUNDATION: Priority = Priority(1000);
    /// Engine-level systems that others depend on.
    pub const SYSTEM: Priority = Priority(100);
    /// Undeclared priority.
    pub const DEFAULT: Priority = Priority(0);
    /// Units that want to observe everything else already set up.
    pub const LATE: Priority = Priority(-100);

    /// Create a priority from a raw value.
    #[inline]
    pub const fn new(value: i32) -> Self {
        Self(value)
    }

    /// Raw integer value.
    #[inline]
    pub const fn value(self) -> i32 {
        self.0
    }

    /// Resolve optional declared metadata, defaulting to 0.
    #[inline]
    pub fn resolve(declared: Option<i32>) -> Self {
        declared.map(Self).unwrap_or_default()
    }
}

impl From<i32> for Priority {
    fn from(value: i32) -> Self {
        Self(value)
    }
}

impl fmt::Display for Priority {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_is_zero() {
        assert_eq!(Priority::default(), Priority::DEFAULT);
        assert_eq!(Priority::resolve(None).value(), 0);
        assert_eq!(Priority::resolve(Some(-7)).value(), -7);
    }

    #[test]
    fn test_named_levels_ordered() {
        assert!(Priority::FOUNDATION > Priority::SYSTEM);
        assert!(Priority::SYSTEM > Priority::DEFAULT);
        assert!(Priority::DEFAULT > Priority::LATE);
    }
}
