//! Runtime configuration
//!
//! Tunables for the actor system, loadable from TOML. Every field has a
//! default so partial files and the empty string are valid.

use crate::EngineError;
use serde::Deserialize;
use std::time::Duration;

/// Actor system tunables.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct SystemConfig {
    /// Bounded mailbox capacity per actor.
    pub mailbox_capacity: usize,
    /// Default bound for request/response waits.
    pub default_timeout_ms: u64,
}

impl Default for SystemConfig {
    fn default() -> Self {
        Self {
            mailbox_capacity: 64,
            default_timeout_ms: 5_000,
        }
    }
}

impl SystemConfig {
    /// Parse a TOML document; absent keys fall back to defaults.
    pub fn from_toml(input: &str) -> Result<Self, EngineError> {
        let config: Self = toml::from_str(input).map_err(|e| EngineError::Config {
            detail: e.to_string(),
        })?;
        config.validate()?;
        Ok(config)
    }

    /// Reject values the runtime cannot operate with.
    pub fn validate(&self) -> Result<(), EngineError> {
        if self.mailbox_capacity == 0 {
            return Err(EngineError::Config {
                detail: "mailbox_capacity must be at least 1".to_string(),
            });
        }
        Ok(())
    }

    pub fn default_timeout(&self) -> Duration {
        Duration::from_millis(self.default_timeout_ms)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_document_yields_defaults() {
        let config = SystemConfig::from_toml("").unwrap();
        assert_eq!(config.mailbox_capacity, 64);
        assert_eq!(config.default_timeout(), Duration::from_secs(5));
    }

    #[test]
    fn partial_document_overrides_selected_keys() {
        let config = SystemConfig::from_toml("mailbox_capacity = 8").unwrap();
        assert_eq!(config.mailbox_capacity, 8);
        assert_eq!(config.default_timeout_ms, 5_000);
    }

    #[test]
    fn malformed_document_is_a_config_error() {
        let err = SystemConfig::from_toml("mailbox_capacity = \"lots\"").unwrap_err();
        assert!(matches!(err, EngineError::Config { .. }));
    }

    #[test]
    fn zero_mailbox_capacity_is_a_config_error() {
        let err = SystemConfig::from_toml("mailbox_capacity = 0").unwrap_err();
        assert!(matches!(err, EngineError::Config { .. }));
    }
}
