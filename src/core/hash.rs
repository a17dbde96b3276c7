//! Order Fingerprints
//!
//! Deterministic hashing of an invocation order, so two passes (or two
//! processes) can confirm they started units in the same sequence.

use sha2::{Digest, Sha256};

use super::priority::Priority;
use super::unit::UnitDescriptor;

/// Hash output type (256 bits / 32 bytes)
pub type OrderFingerprint = [u8; 32];

/// Deterministic hasher for invocation orders.
///
/// Wraps SHA-256. Order of updates is critical for determinism.
pub struct OrderHasher {
    hasher: Sha256,
}

impl OrderHasher {
    /// Create a new hasher with domain separator.
    pub fn new(domain: &[u8]) -> Self {
        let mut hasher = Sha256::new();
        hasher.update(domain);
        Self { hasher }
    }

    /// Create hasher for an initialization order.
    pub fn for_invocation_order() -> Self {
        Self::new(b"STARTUP_SCHEDULER_ORDER_V1")
    }

    /// Update with raw bytes.
    #[inline]
    pub fn update_bytes(&mut self, bytes: &[u8]) {
        self.hasher.update(bytes);
    }

    /// Update with a u32 value (little-endian).
    #[inline]
    pub fn update_u32(&mut self, value: u32) {
        self.hasher.update(value.to_le_bytes());
    }

    /// Update with an i32 value (little-endian).
    #[inline]
    pub fn update_i32(&mut self, value: i32) {
        self.hasher.update(value.to_le_bytes());
    }

    /// Update with a length-prefixed string.
    #[inline]
    pub fn update_str(&mut self, value: &str) {
        self.update_u32(value.len() as u32);
        self.hasher.update(value.as_bytes());
    }

    /// Update with a priority.
    #[inline]
    pub fn update_priority(&mut self, value: Priority) {
        self.update_i32(value.value());
    }

    /// Finalize and return the hash.
    pub fn finalize(self) -> OrderFingerprint {
        self.hasher.finalize().into()
    }
}

/// Fingerprint an ordered sequence of units.
///
/// Only `(name, type_name, priority)` is hashed. Registration sequence
/// numbers are left out so the same unit set registered in a different
/// order yields the same fingerprint when the resulting order matches.
pub fn fingerprint_order<'a, I>(units: I) -> OrderFingerprint
where
    I: IntoIterator<Item = &'a UnitDescriptor>,
{
    let mut hasher = OrderHasher::for_invocation_order();
    let mut count = 0u32;

    for unit in units {
        hasher.update_str(&unit.name);
        hasher.update_str(&unit.type_name);
        hasher.update_priority(unit.priority);
        count += 1;
    }

    hasher.update_u32(count);
    hasher.finalize()
}
