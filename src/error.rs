//! Error Types
//!
//! Unit initialization failures and configuration errors.
//! Neither type ever escapes a scheduling pass: unit failures are
//! caught and reported, configuration errors surface at load time.

use thiserror::Error;

/// Failure raised by a unit's `initialize()`.
#[derive(Debug, Error)]
pub enum InitError {
    /// Generic initialization failure.
    #[error("initialization failed: {0}")]
    Failed(String),

    /// A collaborator the unit expected to be ready was not.
    #[error("missing dependency: {0}")]
    MissingDependency(String),

    /// Unit configuration did not validate.
    #[error("invalid config `{key}`: {reason}")]
    InvalidConfig {
        /// Offending configuration key.
        key: String,
        /// Why it was rejected.
        reason: String,
    },

    /// The unit was already borrowed when the scheduler reached it.
    #[error("unit is busy (already borrowed)")]
    Busy,

    /// `initialize()` panicked.
    #[error("initialization panicked: {0}")]
    Panicked(String),

    /// Ad-hoc failure from unit code.
    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

impl InitError {
    /// Create a generic failure.
    pub fn failed(msg: impl Into<String>) -> Self {
        Self::Failed(msg.into())
    }

    /// Create a missing dependency failure.
    pub fn missing(dependency: impl Into<String>) -> Self {
        Self::MissingDependency(dependency.into())
    }

    /// Create an invalid config failure.
    pub fn invalid_config(key: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::InvalidConfig {
            key: key.into(),
            reason: reason.into(),
        }
    }
}

/// Configuration errors.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ConfigError {
    /// Unknown tie-break policy name.
    #[error("invalid tie-break policy: {0} (expected `name` or `type`)")]
    InvalidTieBreak(String),

    /// Unrecognized boolean value.
    #[error("invalid boolean for `{key}`: {value} (expected true/false, 1/0, yes/no, on/off)")]
    InvalidBool {
        /// Offending key.
        key: String,
        /// Value as given.
        value: String,
    },
}
