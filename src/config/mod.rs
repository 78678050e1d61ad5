//! Configuration management for rebalancing, tuning and boosting.
//!
//! Every configuration is a plain serde struct with public fields, a
//! `validate()` method, a chainable builder whose `build()` validates, and
//! JSON/TOML persistence selected by file extension.

pub mod boosting;
pub mod rebalance;
pub mod tuning;

pub use boosting::{BoostingConfig, BoostingConfigBuilder};
pub use rebalance::{RebalanceConfig, RebalanceConfigBuilder};
pub use tuning::{TuningConfig, TuningConfigBuilder};

use crate::core::error::{RebalanceError, Result};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use std::path::Path;

/// Configuration file format
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ConfigFormat {
    /// TOML configuration format
    Toml,
    /// JSON configuration format
    Json,
}

impl Default for ConfigFormat {
    fn default() -> Self {
        ConfigFormat::Toml
    }
}

impl ConfigFormat {
    /// Format implied by a file extension
    pub fn from_path(path: &Path) -> Result<Self> {
        match path.extension().and_then(|s| s.to_str()) {
            Some("json") => Ok(ConfigFormat::Json),
            Some("toml") => Ok(ConfigFormat::Toml),
            _ => Err(RebalanceError::config(
                "Unsupported config file format. Use .json or .toml",
            )),
        }
    }
}

pub(crate) fn load_from_path<T: DeserializeOwned, P: AsRef<Path>>(path: P) -> Result<T> {
    let path = path.as_ref();
    let format = ConfigFormat::from_path(path)?;
    let content = std::fs::read_to_string(path)
        .map_err(|e| RebalanceError::config(format!("Failed to read config file: {}", e)))?;

    let config = match format {
        ConfigFormat::Json => serde_json::from_str(&content)
            .map_err(|e| RebalanceError::config(format!("Failed to parse JSON config: {}", e)))?,
        ConfigFormat::Toml => toml::from_str(&content)
            .map_err(|e| RebalanceError::config(format!("Failed to parse TOML config: {}", e)))?,
    };

    Ok(config)
}

pub(crate) fn save_to_path<T: Serialize, P: AsRef<Path>>(config: &T, path: P) -> Result<()> {
    let path = path.as_ref();
    let content = match ConfigFormat::from_path(path)? {
        ConfigFormat::Json => serde_json::to_string_pretty(config)
            .map_err(|e| RebalanceError::config(format!("Failed to serialize to JSON: {}", e)))?,
        ConfigFormat::Toml => toml::to_string_pretty(config)
            .map_err(|e| RebalanceError::config(format!("Failed to serialize to TOML: {}", e)))?,
    };

    std::fs::write(path, content)
        .map_err(|e| RebalanceError::config(format!("Failed to write config file: {}", e)))?;

    Ok(())
}
