//! Rebalance-parameter search configuration.

use crate::core::constants::*;
use crate::core::error::{RebalanceError, Result};
use serde::{Deserialize, Serialize};
use std::path::Path;

/// Knobs of the bounded local search that picks a rebalance parameter.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TuningConfig {
    /// Lower bound of the searched interval
    pub min_parameter: f64,
    /// Upper bound of the searched interval
    pub max_parameter: f64,
    /// Candidates evaluated per level
    pub grid_size: usize,
    /// Number of refinement levels; each narrows the radius to the previous grid spacing
    pub depth: usize,
    /// Folds for candidate scoring; 1 scores on the training set directly
    pub folds: usize,
    /// Weight of the fairness term (one minus the mean TPR gap) in the score
    pub fairness_weight: f64,
    /// Evaluate the candidates of one level in parallel
    pub parallel: bool,
    /// Worker threads for parallel evaluation (0 = rayon default)
    pub num_threads: usize,
    /// Seed for fold assignment
    pub random_seed: u64,
}

impl Default for TuningConfig {
    fn default() -> Self {
        TuningConfig {
            min_parameter: DEFAULT_TUNING_MIN,
            max_parameter: DEFAULT_TUNING_MAX,
            grid_size: DEFAULT_TUNING_GRID_SIZE,
            depth: DEFAULT_TUNING_DEPTH,
            folds: DEFAULT_TUNING_FOLDS,
            fairness_weight: DEFAULT_FAIRNESS_WEIGHT,
            parallel: true,
            num_threads: DEFAULT_NUM_THREADS,
            random_seed: DEFAULT_RANDOM_SEED,
        }
    }
}

impl TuningConfig {
    /// Create a new configuration with default values
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a builder
    pub fn builder() -> TuningConfigBuilder {
        TuningConfigBuilder::new()
    }

    /// Validate the configuration parameters
    pub fn validate(&self) -> Result<()> {
        if !self.min_parameter.is_finite() || !self.max_parameter.is_finite() {
            return Err(RebalanceError::invalid_parameter(
                "min_parameter/max_parameter",
                format!("[{}, {}]", self.min_parameter, self.max_parameter),
                "bounds must be finite",
            ));
        }
        if self.min_parameter >= self.max_parameter {
            return Err(RebalanceError::invalid_parameter(
                "min_parameter",
                self.min_parameter.to_string(),
                "must be smaller than max_parameter",
            ));
        }
        if self.grid_size == 0 {
            return Err(RebalanceError::invalid_parameter(
                "grid_size",
                "0",
                "must be at least 1",
            ));
        }
        if self.depth == 0 {
            return Err(RebalanceError::invalid_parameter("depth", "0", "must be at least 1"));
        }
        if self.folds == 0 {
            return Err(RebalanceError::invalid_parameter("folds", "0", "must be at least 1"));
        }
        if !(0.0..=1.0).contains(&self.fairness_weight) {
            return Err(RebalanceError::invalid_parameter(
                "fairness_weight",
                self.fairness_weight.to_string(),
                "must be in range [0.0, 1.0]",
            ));
        }

        if self.num_threads > num_cpus::get() * 2 {
            log::warn!(
                "num_threads ({}) is much larger than available cores ({})",
                self.num_threads,
                num_cpus::get()
            );
        }

        Ok(())
    }

    /// Midpoint of the searched interval
    pub fn center(&self) -> f64 {
        (self.min_parameter + self.max_parameter) / 2.0
    }

    /// Half-width of the searched interval
    pub fn radius(&self) -> f64 {
        (self.max_parameter - self.min_parameter) / 2.0
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

/// Builder for [`TuningConfig`]
#[derive(Debug, Clone, Default)]
pub struct TuningConfigBuilder {
    config: TuningConfig,
}

impl TuningConfigBuilder {
    /// Create a new builder with default values
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the searched interval
    pub fn bounds(mut self, min: f64, max: f64) -> Self {
        self.config.min_parameter = min;
        self.config.max_parameter = max;
        self
    }

    /// Set the number of candidates per level
    pub fn grid_size(mut self, grid_size: usize) -> Self {
        self.config.grid_size = grid_size;
        self
    }

    /// Set the number of refinement levels
    pub fn depth(mut self, depth: usize) -> Self {
        self.config.depth = depth;
        self
    }

    /// Set the number of scoring folds
    pub fn folds(mut self, folds: usize) -> Self {
        self.config.folds = folds;
        self
    }

    /// Set the fairness weight of the score
    pub fn fairness_weight(mut self, weight: f64) -> Self {
        self.config.fairness_weight = weight;
        self
    }

    /// Enable or disable parallel candidate evaluation
    pub fn parallel(mut self, parallel: bool) -> Self {
        self.config.parallel = parallel;
        self
    }

    /// Set the number of worker threads
    pub fn num_threads(mut self, threads: usize) -> Self {
        self.config.num_threads = threads;
        self
    }

    /// Set the fold-assignment seed
    pub fn random_seed(mut self, seed: u64) -> Self {
        self.config.random_seed = seed;
        self
    }

    /// Build the configuration
    pub fn build(self) -> Result<TuningConfig> {
        self.config.validate()?;
        Ok(self.config)
    }
}
