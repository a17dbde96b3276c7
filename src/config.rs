//! Scheduler Configuration

use serde::{Deserialize, Serialize};

use crate::error::ConfigError;
use crate::registry::DEFAULT_SCOPE;
use crate::scheduler::order::TieBreak;

/// Scheduler configuration.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct SchedulerConfig {
    /// Name of the discovery scope (scene, process, ...). Names the registry
    /// `Bootstrap` creates; reports always carry the registry's own scope.
    pub scope: String,
    /// Key used to order units of equal priority.
    pub tie_break: TieBreak,
    /// Unit panics are always caught and reported. When false, the first one
    /// is re-raised after the pass has completed.
    pub catch_panics: bool,
}

impl Default for SchedulerConfig {
    fn default() -> Self {
        Self {
            scope: DEFAULT_SCOPE.to_string(),
            tie_break: TieBreak::Name,
            catch_panics: true,
        }
    }
}

impl SchedulerConfig {
    /// Create config from environment variables.
    ///
    /// - `STARTUP_SCOPE`: scope name
    /// - `STARTUP_TIE_BREAK`: `name` or `type`
    /// - `STARTUP_CATCH_PANICS`: `true`/`1`/`yes`/`on` or `false`/`0`/`no`/`off`
    ///   (case-insensitive); anything else is an error
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Build config from an arbitrary key lookup. Unset keys keep defaults.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let defaults = Self::default();

        let tie_break = match lookup("STARTUP_TIE_BREAK") {
            Some(value) => value.parse()?,
            None => defaults.tie_break,
        };

        Ok(Self {
            scope: lookup("STARTUP_SCOPE").unwrap_or(defaults.scope),
            tie_break,
            catch_panics: match lookup("STARTUP_CATCH_PANICS") {
                Some(value) => parse_bool("STARTUP_CATCH_PANICS", &value)?,
                None => defaults.catch_panics,
            },
        })
    }

    /// Set the scope name.
    pub fn with_scope(mut self, scope: impl Into<String>) -> Self {
        self.scope = scope.into();
        self
    }

    /// Set the tie-break policy.
    pub fn with_tie_break(mut self, tie_break: TieBreak) -> Self {
        self.tie_break = tie_break;
        self
    }

    /// Report unit panics as failures (`true`), or also re-raise the first
    /// one once the pass has finished (`false`).
    pub fn with_catch_panics(mut self, catch_panics: bool) -> Self {
        self.catch_panics = catch_panics;
        self
    }
}

fn parse_bool(key: &str, value: &str) -> Result<bool, ConfigError> {
    match value.trim().to_ascii_lowercase().as_str() {
        "true" | "1" | "yes" | "on" => Ok(true),
        "false" | "0" | "no" | "off" => Ok(false),
        _ => Err(ConfigError::InvalidBool {
            key: key.to_string(),
            value: value.to_string(),
        }),
    }
}
