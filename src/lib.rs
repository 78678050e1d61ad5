//! # Imbalance Boost
//!
//! Classification under class imbalance: a post-hoc probability
//! rebalancing layer around arbitrary classifiers, and a boosting variant
//! whose reweighting accounts for per-class priors rather than raw error.
//!
//! ## Features
//!
//! - **Rebalancing wrapper**: reshape a base classifier's output
//!   distribution toward rare classes with exponential, linear, log,
//!   inverse or threshold functions of the class priors, scaled per
//!   prediction by entropy, margin or neighborhood cleanliness.
//! - **Parameter search**: bounded local search for the rebalance strength,
//!   optionally cross-validated and evaluated in parallel with Rayon.
//! - **Prior-aware boosting**: ensembles trained with a prior-weighted
//!   pseudo-loss, best-prefix retention and early termination.
//! - **Class-balanced metrics**: per-class true-positive rates, geometric
//!   and arithmetic means, and prior-weighted imbalance.
//!
//! Base learners are not part of this crate. Anything implementing
//! [`Classifier`] can be wrapped or boosted.
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use imbalance_boost::*;
//!
//! # fn example(base: Box<dyn Classifier>, dataset: &Dataset) -> Result<()> {
//! imbalance_boost::init()?;
//!
//! // Exponential rebalancing with a tuned strength and entropy scaling
//! let config = RebalanceConfig::from_scheme("teexp")?;
//! let mut wrapper = RebalancingWrapper::new(base.clone(), config)?;
//! wrapper.train(dataset)?;
//! println!("tuned parameter: {}", wrapper.rebalance_parameter());
//!
//! // Boosted ensemble of spread-subsampled members
//! let mut ensemble = BoostedEnsemble::uniform_resampling(base, BoostingConfig::default())?;
//! ensemble.train(dataset)?;
//!
//! let counts = evaluate_classifier(&ensemble, dataset)?;
//! println!("geometric mean TPR: {:.3}", counts.geometric_mean_tpr());
//! # Ok(())
//! # }
//! ```
//!
//! ## Architecture
//!
//! - [`core`]: error handling, enums, constants, numeric helpers and traits
//! - [`config`]: serializable configurations with builders and option parsing
//! - [`dataset`]: labeled weighted datasets, class priors and resamplers
//! - [`rebalance`]: the rebalancing wrapper, its tuning search and adaptive weights
//! - [`boosting`]: the boosted ensemble and its policies
//! - [`metrics_eval`]: class-balanced evaluation metrics
//! - [`hyperopt`]: k-fold cross-validation
//! - [`registry`]: named classifier construction

#![doc(html_root_url = "https://docs.rs/imbalance-boost/")]
#![cfg_attr(docsrs, feature(doc_cfg))]
#![warn(missing_docs)]
#![deny(unsafe_op_in_unsafe_fn)]
#![warn(
    missing_debug_implementations,
    rust_2018_idioms,
    unreachable_pub,
    non_snake_case,
    non_upper_case_globals
)]

// Core infrastructure module - always available
pub mod core;

// Configuration management module
pub mod config;

// Dataset management module
pub mod dataset;

// Probability rebalancing module
pub mod rebalance;

// Boosting module
pub mod boosting;

// Metrics evaluation module
pub mod metrics_eval;

// Cross-validation module
pub mod hyperopt;

// Classifier registry module
pub mod registry;

// Re-export core functionality for convenience
pub use crate::core::{
    constants::*,
    error::{DatasetError, RebalanceError, Result, TrainingError},
    traits::*,
    types::*,
};

// Re-export configuration functionality
pub use config::{
    rebalance::scheme_to_options, BoostingConfig, BoostingConfigBuilder, ConfigFormat,
    RebalanceConfig, RebalanceConfigBuilder, TuningConfig, TuningConfigBuilder,
};

// Re-export dataset functionality
pub use dataset::{
    ClassBiasedResample, ClassPriors, Dataset, DatasetBuilder, Instance, Smote, SpreadSubsample,
};

// Re-export rebalancing functionality
pub use rebalance::{
    tune_parameter, AdaptiveClassWeights, RebalanceState, RebalancingWrapper, TuningOutcome,
};

// Re-export boosting functionality
pub use boosting::{
    BoostedEnsemble, BoostingPolicy, ClusterBoost, ClusterPolicy, EnsembleMember,
    RebalanceSweepBoost, RebalanceSweepPolicy, RoundSummary, UniformResamplingBoost,
    UniformResamplingPolicy,
};

// Re-export metrics evaluation functionality
pub use metrics_eval::{evaluate_classifier, information_loss, ClassCounts, ImbalanceMetrics};

// Re-export cross-validation functionality
pub use hyperopt::{assign_folds, cross_validate, CrossValidationConfig, CrossValidationResult};

pub use registry::ClassifierRegistry;

// Version information
pub use crate::core::constants::IMBALANCE_BOOST_VERSION as VERSION;

/// Initialize the library.
///
/// Installs an `env_logger` logger (filter taken from `RUST_LOG`, `info` by
/// default). Calling it more than once is harmless, and an application that
/// installs its own logger first keeps it.
///
/// # Examples
///
/// ```rust
/// fn main() -> imbalance_boost::Result<()> {
///     imbalance_boost::init()?;
///     Ok(())
/// }
/// ```
pub fn init() -> Result<()> {
    crate::core::initialize_logging();
    log::debug!("imbalance-boost {} initialized", VERSION);
    Ok(())
}

/// Check if the library has been initialized.
pub fn is_initialized() -> bool {
    crate::core::is_logging_initialized()
}
