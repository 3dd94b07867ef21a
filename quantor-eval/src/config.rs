//! Engine configuration.
//!
//! Loaded from TOML; every field is optional and falls back to its default.

use std::path::Path;

use miette::Report;
use quantor_values::DEFAULT_POWERSET_LIMIT;
use serde::{Deserialize, Serialize};

pub type ConfigError = Report;

fn config_msg(message: impl Into<String>) -> ConfigError {
    Report::msg(message.into())
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct EngineConfig {
    /// Largest set whose power set may be generated.
    #[serde(default = "default_powerset_limit")]
    pub powerset_limit: usize,

    /// Treat a binding domain that names an unbound variable as empty instead
    /// of failing.
    #[serde(default)]
    pub allow_unresolved: bool,

    /// Match set patterns against every ordering of a set value, not just the
    /// first.
    #[serde(default)]
    pub all_possibilities: bool,
}

fn default_powerset_limit() -> usize {
    DEFAULT_POWERSET_LIMIT
}

impl Default for EngineConfig {
    fn default() -> Self {
        EngineConfig {
            powerset_limit: DEFAULT_POWERSET_LIMIT,
            allow_unresolved: false,
            all_possibilities: false,
        }
    }
}

impl EngineConfig {
    pub fn from_toml_str(content: &str) -> Result<Self, ConfigError> {
        toml::from_str(content).map_err(|e| config_msg(format!("Failed to parse config: {}", e)))
    }

    pub fn from_file(path: &Path) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path)
            .map_err(|e| config_msg(format!("Failed to read config: {}", e)))?;
        Self::from_toml_str(&content)
    }

    pub fn to_toml_string(&self) -> Result<String, ConfigError> {
        toml::to_string_pretty(self)
            .map_err(|e| config_msg(format!("Failed to serialize config: {}", e)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn missing_fields_take_defaults() {
        let cfg = EngineConfig::from_toml_str("allow_unresolved = true\n").expect("parse");
        assert_eq!(cfg.powerset_limit, DEFAULT_POWERSET_LIMIT);
        assert!(cfg.allow_unresolved);
        assert!(!cfg.all_possibilities);
    }

    #[test]
    fn roundtrips_through_toml() {
        let cfg = EngineConfig {
            powerset_limit: 8,
            ..EngineConfig::default()
        };
        let text = cfg.to_toml_string().expect("serialize");
        assert_eq!(EngineConfig::from_toml_str(&text).expect("parse"), cfg);
    }

    #[test]
    fn malformed_config_is_reported() {
        let err = EngineConfig::from_toml_str("powerset_limit = \"many\"").expect_err("bad type");
        assert!(err.to_string().contains("Failed to parse config"));
    }
}
