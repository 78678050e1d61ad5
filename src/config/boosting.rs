//! Boosting ensemble configuration.

use crate::core::constants::{DEFAULT_MAX_SPREAD, DEFAULT_NUM_MEMBERS, DEFAULT_RANDOM_SEED};
use crate::core::error::{RebalanceError, Result};
use crate::ensure;
use serde::{Deserialize, Serialize};
use std::path::Path;

/// Configuration shared by every boosting policy.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct BoostingConfig {
    /// Number of members to train, an upper bound when training stops early
    pub num_members: usize,
    /// Largest allowed majority-to-minority ratio for spread subsampling
    pub max_spread: f64,
    /// Seed of the per-run random generator
    pub random_seed: u64,
}

impl Default for BoostingConfig {
    fn default() -> Self {
        BoostingConfig {
            num_members: DEFAULT_NUM_MEMBERS,
            max_spread: DEFAULT_MAX_SPREAD,
            random_seed: DEFAULT_RANDOM_SEED,
        }
    }
}

impl BoostingConfig {
    /// Create a new configuration with default values
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a builder
    pub fn builder() -> BoostingConfigBuilder {
        BoostingConfigBuilder::new()
    }

    /// Validate the configuration parameters
    pub fn validate(&self) -> Result<()> {
        ensure!(
            self.num_members > 0,
            RebalanceError::invalid_parameter("num_members", "0", "must be at least 1")
        );
        if !self.max_spread.is_finite() || self.max_spread < 1.0 {
            return Err(RebalanceError::invalid_parameter(
                "max_spread",
                self.max_spread.to_string(),
                "must be a finite value >= 1.0",
            ));
        }
        Ok(())
    }

    /// Load configuration from a `.json` or `.toml` file
    pub fn load_from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let config: Self = super::load_from_path(path)?;
        config.validate()?;
        Ok(config)
    }

    /// Save configuration to a `.json` or `.toml` file
    pub fn save_to_file<P: AsRef<Path>>(&self, path: P) -> Result<()> {
        super::save_to_path(self, path)
    }
}

/// Builder for [`BoostingConfig`]
#[derive(Debug, Clone, Default)]
pub struct BoostingConfigBuilder {
    config: BoostingConfig,
}

impl BoostingConfigBuilder {
    /// Create a new builder with default values
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the number of members
    pub fn num_members(mut self, num_members: usize) -> Self {
        self.config.num_members = num_members;
        self
    }

    /// Set the spread limit used by resampling policies
    pub fn max_spread(mut self, max_spread: f64) -> Self {
        self.config.max_spread = max_spread;
        self
    }

    /// Set the random seed
    pub fn random_seed(mut self, seed: u64) -> Self {
        self.config.random_seed = seed;
        self
    }

    /// Build the configuration
    pub fn build(self) -> Result<BoostingConfig> {
        self.config.validate()?;
        Ok(self.config)
    }
}
