//! Pass Reports
//!
//! Serializable record of one scheduling pass: what ran, in which order,
//! and how each invocation ended.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::core::hash::{fingerprint_order, OrderFingerprint};
use crate::core::priority::Priority;
use crate::core::unit::UnitDescriptor;

/// How a single `initialize()` call ended.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "status", content = "error", rename_all = "snake_case")]
pub enum InvocationOutcome {
    /// Returned `Ok`.
    Succeeded,
    /// Returned `Err` or panicked; holds the rendered error.
    Failed(String),
}

impl InvocationOutcome {
    /// Did the call succeed?
    pub fn is_success(&self) -> bool {
        matches!(self, Self::Succeeded)
    }
}

/// One entry per unit, in invocation order.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct InvocationRecord {
    /// Zero-based position in the pass.
    pub position: usize,
    /// Unit metadata at discovery.
    pub unit: UnitDescriptor,
    /// Result of the call.
    pub outcome: InvocationOutcome,
    /// Wall time spent inside `initialize()`.
    pub elapsed_micros: u64,
}

/// Summary of a completed pass.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct PassReport {
    /// Unique pass identifier.
    pub pass_id: Uuid,
    /// Discovery scope.
    pub scope: String,
    /// When the pass started.
    pub started_at: DateTime<Utc>,
    /// Invocations, in order.
    pub invocations: Vec<InvocationRecord>,
    /// Fingerprint of the invocation order.
    #[serde(with = "hex_fingerprint")]
    pub fingerprint: OrderFingerprint,
}

impl PassReport {
    /// Build a report, computing the order fingerprint from `invocations`.
    pub fn new(scope: String, started_at: DateTime<Utc>, invocations: Vec<InvocationRecord>) -> Self {
        let fingerprint = fingerprint_order(invocations.iter().map(|r| &r.unit));
        Self {
            pass_id: Uuid::new_v4(),
            scope,
            started_at,
            invocations,
            fingerprint,
        }
    }

    /// Number of units invoked.
    pub fn unit_count(&self) -> usize {
        self.invocations.len()
    }

    /// Number of failed invocations.
    pub fn failure_count(&self) -> usize {
        self.invocations
            .iter()
            .filter(|r| !r.outcome.is_success())
            .count()
    }

    /// Failed invocations, in order.
    pub fn failures(&self) -> impl Iterator<Item = &InvocationRecord> {
        self.invocations.iter().filter(|r| !r.outcome.is_success())
    }

    /// Unit names in invocation order.
    pub fn order(&self) -> Vec<&str> {
        self.invocations.iter().map(|r| r.unit.name.as_str()).collect()
    }

    /// Priorities in invocation order.
    pub fn priorities(&self) -> Vec<Priority> {
        self.invocations.iter().map(|r| r.unit.priority).collect()
    }

    /// Hex-encoded order fingerprint.
    pub fn fingerprint_hex(&self) -> String {
        hex::encode(self.fingerprint)
    }
}

/// Result of asking the scheduler to run.
#[derive(Clone, Debug)]
pub enum PassOutcome {
    /// The pass ran.
    Completed(PassReport),
    /// A pass had already run; nothing was done.
    AlreadyInitialized,
}

impl PassOutcome {
    /// The report, if this call ran the pass.
    pub fn report(&self) -> Option<&PassReport> {
        match self {
            Self::Completed(report) => Some(report),
            Self::AlreadyInitialized => None,
        }
    }

    /// Was this a guarded no-op?
    pub fn was_noop(&self) -> bool {
        matches!(self, Self::AlreadyInitialized)
    }
}

mod hex_fingerprint {
    use serde::{de::Error, Deserialize, Deserializer, Serializer};

    use crate::core::hash::OrderFingerprint;

    pub fn serialize<S: Serializer>(value: &OrderFingerprint, s: S) -> Result<S::Ok, S::Error> {
        s.serialize_str(&hex::encode(value))
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(d: D) -> Result<OrderFingerprint, D::Error> {
        let text = String::deserialize(d)?;
        let bytes = hex::decode(&text).map_err(D::Error::custom)?;
        bytes
            .try_into()
            .map_err(|_| D::Error::custom("fingerprint must be 32 bytes"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn record(position: usize, name: &str, outcome: InvocationOutcome) -> InvocationRecord {
        InvocationRecord {
            position,
            unit: UnitDescriptor {
                seq: position as u64,
                name: name.into(),
                type_name: "T".into(),
                priority: Priority::DEFAULT,
                active: true,
            },
            outcome,
            elapsed_micros: 0,
        }
    }

    #[test]
    fn test_failure_accounting() {
        let report = PassReport::new(
            "scene".into(),
            Utc::now(),
            vec![
                record(0, "A", InvocationOutcome::Succeeded),
                record(1, "B", InvocationOutcome::Failed("boom".into())),
            ],
        );

        assert_eq!(report.unit_count(), 2);
        assert_eq!(report.failure_count(), 1);
        assert_eq!(report.failures().next().unwrap().unit.name, "B");
        assert_eq!(report.order(), ["A", "B"]);
    }

    #[test]
    fn test_json_shape() {
        let report = PassReport::new(
            "scene".into(),
            Utc::now(),
            vec![record(0, "A", InvocationOutcome::Failed("boom".into()))],
        );

        let json = serde_json::to_value(&report).unwrap();
        assert_eq!(json["fingerprint"], report.fingerprint_hex());
        assert_eq!(json["invocations"][0]["outcome"]["status"], "failed");
        assert_eq!(json["invocations"][0]["outcome"]["error"], "boom");

        let back: PassReport = serde_json::from_value(json).unwrap();
        assert_eq!(back.fingerprint, report.fingerprint);
    }

    #[test]
    fn test_noop_outcome() {
        assert!(PassOutcome::AlreadyInitialized.was_noop());
        assert!(PassOutcome::AlreadyInitialized.report().is_none());
    }
}
