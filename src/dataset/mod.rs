//! Dataset management module.
//!
//! This module provides the labeled, weighted [`Dataset`] the rest of the
//! crate trains on, the [`ClassPriors`] estimator, and the resampling
//! collaborators ([`ClassBiasedResample`], [`SpreadSubsample`], [`Smote`])
//! that produce new training views from it.

pub mod dataset;
pub mod priors;
pub mod sampling;

pub use dataset::{Dataset, DatasetBuilder, Instance};
pub use priors::ClassPriors;
pub use sampling::{ClassBiasedResample, Smote, SpreadSubsample};
