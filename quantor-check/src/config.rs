//! Checker configuration, read from TOML.
//!
//! ```toml
//! parallel = true
//! nat_limit = 4
//!
//! [engine]
//! powerset_limit = 12
//! ```

use std::path::Path;

use miette::Report;
use quantor_eval::EngineConfig;
use serde::{Deserialize, Serialize};

pub type ConfigError = Report;

fn config_msg(message: impl Into<String>) -> ConfigError {
    Report::msg(message.into())
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct CheckerConfig {
    #[serde(default)]
    pub engine: EngineConfig,

    /// Check obligations on the rayon pool instead of one after another.
    #[serde(default)]
    pub parallel: bool,

    /// Default `nat` range is `{0, ..., nat_limit}`.
    #[serde(default = "default_nat_limit")]
    pub nat_limit: u32,

    /// Default `int` range is `{-int_limit, ..., int_limit}`.
    #[serde(default = "default_int_limit")]
    pub int_limit: u32,

    #[serde(default = "default_char_sample")]
    pub char_sample: String,

    /// Largest element range from which default `set of`/`seq of` ranges are
    /// generated.
    #[serde(default = "default_collection_limit")]
    pub collection_limit: usize,
}

fn default_nat_limit() -> u32 {
    3
}

fn default_int_limit() -> u32 {
    2
}

fn default_char_sample() -> String {
    "abc".to_string()
}

fn default_collection_limit() -> usize {
    4
}

impl Default for CheckerConfig {
    fn default() -> Self {
        CheckerConfig {
            engine: EngineConfig::default(),
            parallel: false,
            nat_limit: default_nat_limit(),
            int_limit: default_int_limit(),
            char_sample: default_char_sample(),
            collection_limit: default_collection_limit(),
        }
    }
}

impl CheckerConfig {
    pub fn from_toml_str(content: &str) -> Result<Self, ConfigError> {
        toml::from_str(content).map_err(|e| config_msg(format!("Failed to parse config: {}", e)))
    }

    pub fn from_file(path: &Path) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path)
            .map_err(|e| config_msg(format!("Failed to read config: {}", e)))?;
        Self::from_toml_str(&content)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn nested_engine_table_is_read() {
        let cfg = CheckerConfig::from_toml_str(
            "parallel = true\nnat_limit = 5\n\n[engine]\npowerset_limit = 12\n",
        )
        .expect("parse");
        assert!(cfg.parallel);
        assert_eq!(cfg.nat_limit, 5);
        assert_eq!(cfg.int_limit, 2);
        assert_eq!(cfg.engine.powerset_limit, 12);
        assert!(!cfg.engine.allow_unresolved);
    }

    #[test]
    fn negative_limits_are_rejected() {
        let err = CheckerConfig::from_toml_str("int_limit = -9223372036854775808\n")
            .expect_err("negative");
        assert!(err.to_string().contains("Failed to parse config"));
        assert!(CheckerConfig::from_toml_str("nat_limit = -1\n").is_err());
    }

    #[test]
    fn empty_config_is_default() {
        assert_eq!(CheckerConfig::from_toml_str("").expect("parse"), CheckerConfig::default());
    }

    #[test]
    fn missing_file_is_reported() {
        let err = CheckerConfig::from_file(Path::new("/nonexistent/quantor.toml"))
            .expect_err("no file");
        assert!(err.to_string().contains("Failed to read config"));
    }
}
