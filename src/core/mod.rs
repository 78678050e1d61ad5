//! Core infrastructure module.
//!
//! This module provides the foundational components shared by every other
//! part of the crate:
//!
//! - [`types`]: rebalance function, dynamic form and preprocessing enums
//! - [`constants`]: configuration defaults
//! - [`error`]: error types and the crate [`Result`] alias
//! - [`math`]: entropy, normalization and distance helpers
//! - [`traits`]: the [`Classifier`] and [`Resampler`] capabilities
//!
//! ```rust
//! use imbalance_boost::core::{
//!     math::normalized_entropy,
//!     types::FunctionForm,
//!     constants::DEFAULT_FAIRNESS_WEIGHT,
//! };
//!
//! let form: FunctionForm = "exp".parse()?;
//! assert_eq!(form, FunctionForm::Exponential);
//! assert!((normalized_entropy(&[0.5, 0.5]) - 1.0).abs() < 1e-12);
//! assert!(DEFAULT_FAIRNESS_WEIGHT > 0.0);
//! # Ok::<(), imbalance_boost::RebalanceError>(())
//! ```

pub mod constants;
pub mod error;
pub mod math;
pub mod traits;
pub mod types;

pub use constants::*;
pub use error::{RebalanceError, Result};
pub use traits::*;
pub use types::*;

use std::sync::Once;

static LOGGER_INIT: Once = Once::new();

/// Install `env_logger` once, defaulting the filter to `info`.
///
/// Safe to call repeatedly and from several threads; an already installed
/// logger is left in place.
pub fn initialize_logging() {
    LOGGER_INIT.call_once(|| {
        let env = env_logger::Env::default().default_filter_or("info");
        if env_logger::Builder::from_env(env).try_init().is_ok() {
            log::debug!("Logging initialized");
        }
    });
}

/// Whether [`initialize_logging`] has run.
pub fn is_logging_initialized() -> bool {
    LOGGER_INIT.is_completed()
}
