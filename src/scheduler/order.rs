//! Invocation Ordering
//!
//! Turns a discovery snapshot into a total, deterministic order:
//!
//! 1. priority, descending
//! 2. tie-break key, ascending (instance name, or type then name)
//! 3. registration sequence, ascending
//!
//! Step 3 only matters when keys collide, and keeps the order total.

use std::cmp::Ordering;
use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::core::priority::Priority;
use crate::core::unit::UnitDescriptor;
use crate::error::ConfigError;
use crate::registry::DiscoveredUnit;

/// Key used to order units of equal priority.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TieBreak {
    /// Instance name.
    #[default]
    Name,
    /// Type identity, then instance name.
    TypeName,
}

impl FromStr for TieBreak {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "name" => Ok(Self::Name),
            "type" | "type_name" => Ok(Self::TypeName),
            other => Err(ConfigError::InvalidTieBreak(other.to_string())),
        }
    }
}

impl fmt::Display for TieBreak {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Name => f.write_str("name"),
            Self::TypeName => f.write_str("type"),
        }
    }
}

/// A `(unit, priority)` pair, alive only for one pass.
#[derive(Debug)]
pub struct OrderingPair {
    /// The discovered unit.
    pub unit: DiscoveredUnit,
    /// Resolved priority.
    pub priority: Priority,
}

impl OrderingPair {
    /// Build a pair from a discovered unit.
    pub fn new(unit: DiscoveredUnit) -> Self {
        let priority = unit.descriptor.priority;
        Self { unit, priority }
    }

    /// Metadata of the paired unit.
    pub fn descriptor(&self) -> &UnitDescriptor {
        &self.unit.descriptor
    }
}

/// Compare two descriptors under `tie_break`.
pub fn compare_units(a: &UnitDescriptor, b: &UnitDescriptor, tie_break: TieBreak) -> Ordering {
    let by_priority = b.priority.cmp(&a.priority);
    let by_key = match tie_break {
        TieBreak::Name => a.name.cmp(&b.name),
        TieBreak::TypeName => a
            .type_name
            .cmp(&b.type_name)
            .then_with(|| a.name.cmp(&b.name)),
    };

    by_priority.then(by_key).then(a.seq.cmp(&b.seq))
}

/// Pair up and sort a discovery snapshot.
pub fn compute_order(units: Vec<DiscoveredUnit>, tie_break: TieBreak) -> Vec<OrderingPair> {
    let mut pairs: Vec<OrderingPair> = units.into_iter().map(OrderingPair::new).collect();
    pairs.sort_by(|a, b| compare_units(a.descriptor(), b.descriptor(), tie_break));
    pairs
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::unit::Initializable;
    use crate::error::InitError;
    use proptest::prelude::*;
    use std::cell::RefCell;
    use std::rc::Rc;

    struct Noop;

    impl Initializable for Noop {
        fn initialize(&mut self) -> Result<(), InitError> {
            Ok(())
        }
    }

    fn unit(seq: u64, name: &str, type_name: &str, priority: i32) -> DiscoveredUnit {
        DiscoveredUnit {
            descriptor: UnitDescriptor {
                seq,
                name: name.into(),
                type_name: type_name.into(),
                priority: Priority(priority),
                active: true,
            },
            unit: Rc::new(RefCell::new(Noop)),
        }
    }

    fn names(order: &[OrderingPair]) -> Vec<String> {
        order.iter().map(|p| p.descriptor().name.clone()).collect()
    }

    #[test]
    fn test_priority_then_name() {
        let units = vec![
            unit(0, "Zed", "T", 0),
            unit(1, "Alpha", "T", 10),
            unit(2, "Beta", "T", 10),
        ];
        let order = compute_order(units, TieBreak::Name);
        assert_eq!(names(&order), ["Alpha", "Beta", "Zed"]);
    }

    #[test]
    fn test_negative_priorities_run_last() {
        let units = vec![
            unit(0, "Late", "T", -5),
            unit(1, "Plain", "T", 0),
            unit(2, "Early", "T", 3),
        ];
        let order = compute_order(units, TieBreak::Name);
        assert_eq!(names(&order), ["Early", "Plain", "Late"]);
    }

    #[test]
    fn test_duplicate_names_fall_back_to_sequence() {
        let units = vec![unit(5, "Coin", "T", 0), unit(2, "Coin", "T", 0)];
        let order = compute_order(units, TieBreak::Name);
        let seqs: Vec<u64> = order.iter().map(|p| p.descriptor().seq).collect();
        assert_eq!(seqs, [2, 5]);
    }

    #[test]
    fn test_type_name_tie_break() {
        let units = vec![
            unit(0, "A", "game::Zebra", 0),
            unit(1, "B", "game::Apple", 0),
            unit(2, "A", "game::Apple", 0),
        ];
        let order = compute_order(units, TieBreak::TypeName);
        let keys: Vec<(String, String)> = order
            .iter()
            .map(|p| (p.descriptor().type_name.clone(), p.descriptor().name.clone()))
            .collect();
        assert_eq!(
            keys,
            [
                ("game::Apple".to_string(), "A".to_string()),
                ("game::Apple".to_string(), "B".to_string()),
                ("game::Zebra".to_string(), "A".to_string()),
            ]
        );
    }

    #[test]
    fn test_tie_break_from_str() {
        assert_eq!("name".parse::<TieBreak>(), Ok(TieBreak::Name));
        assert_eq!(" Type ".parse::<TieBreak>(), Ok(TieBreak::TypeName));
        assert_eq!(
            "random".parse::<TieBreak>(),
            Err(ConfigError::InvalidTieBreak("random".into()))
        );
    }

    #[test]
    fn test_order_independent_of_discovery_order() {
        let specs = [
            ("Config", 100),
            ("Quality", 50),
            ("Magnet", 0),
            ("Spiral", 0),
            ("Auth", 10),
            ("Board", 0),
        ];
        let build = |perm: &[usize]| -> Vec<String> {
            let units = perm
                .iter()
                .map(|&i| unit(i as u64, specs[i].0, "T", specs[i].1))
                .collect();
            names(&compute_order(units, TieBreak::Name))
        };

        let baseline = build(&[0, 1, 2, 3, 4, 5]);
        for k in 1..6 {
            let mut perm = [0, 1, 2, 3, 4, 5];
            perm.rotate_left(k);
            assert_eq!(build(&perm), baseline);
            perm.reverse();
            assert_eq!(build(&perm), baseline);
        }
    }

    /// Unit specs plus shuffled discovery orders over them.
    fn shuffled_specs(
        name_pattern: &'static str,
        max_len: usize,
    ) -> impl Strategy<Value = (Vec<(i32, String)>, Vec<usize>, Vec<usize>)> {
        prop::collection::vec((-3i32..3, name_pattern), 0..max_len).prop_flat_map(|specs| {
            let indices: Vec<usize> = (0..specs.len()).collect();
            (
                Just(specs),
                Just(indices.clone()).prop_shuffle(),
                Just(indices).prop_shuffle(),
            )
        })
    }

    fn discover_in(specs: &[(i32, String)], perm: &[usize]) -> Vec<DiscoveredUnit> {
        perm.iter()
            .map(|&i| unit(i as u64, &specs[i].1, "T", specs[i].0))
            .collect()
    }

    proptest! {
        #[test]
        fn prop_priority_and_name_order((specs, perm, _) in shuffled_specs("[a-d]{1,2}", 12)) {
            let order = compute_order(discover_in(&specs, &perm), TieBreak::Name);
            prop_assert_eq!(order.len(), specs.len());

            for w in order.windows(2) {
                let (a, b) = (w[0].descriptor(), w[1].descriptor());
                prop_assert!(a.priority >= b.priority);
                if a.priority == b.priority {
                    prop_assert!(a.name <= b.name);
                    if a.name == b.name {
                        prop_assert!(a.seq < b.seq);
                    }
                }
            }
        }

        #[test]
        fn prop_same_set_same_order((specs, perm_a, perm_b) in shuffled_specs("[a-c]{1,2}", 10)) {
            let run = |perm: &[usize]| -> Vec<u64> {
                compute_order(discover_in(&specs, perm), TieBreak::Name)
                    .iter()
                    .map(|p| p.descriptor().seq)
                    .collect()
            };
            prop_assert_eq!(run(&perm_a), run(&perm_b));
        }
    }
}
