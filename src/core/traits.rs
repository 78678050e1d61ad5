//! Core trait definitions.
//!
//! [`Classifier`] is the capability every base learner, rebalancing wrapper
//! and boosted ensemble exposes. [`Resampler`] is the dataset-to-dataset
//! collaborator used for preprocessing and per-round training views.

use crate::core::error::Result;
use crate::core::math::argmax;
use crate::core::types::ClassIndex;
use crate::dataset::Dataset;
use ndarray::ArrayView1;
use rand::rngs::StdRng;
use std::fmt::Debug;

/// A trainable probabilistic classifier over `K` classes.
pub trait Classifier: Send + Sync + Debug {
    /// Fit the classifier to a labeled, weighted dataset.
    fn train(&mut self, dataset: &Dataset) -> Result<()>;

    /// Class-probability vector of length `K` for one feature row.
    fn predict_distribution(&self, features: &ArrayView1<'_, f64>) -> Result<Vec<f64>>;

    /// Most probable class, ties broken toward the lowest index.
    ///
    /// Returns `None` when the distribution is degenerate (all zero).
    fn predict_label(&self, features: &ArrayView1<'_, f64>) -> Result<Option<ClassIndex>> {
        Ok(argmax(&self.predict_distribution(features)?))
    }

    /// Short name used in log lines.
    fn name(&self) -> &'static str;

    /// Independent copy sharing no mutable state with `self`.
    fn clone_box(&self) -> Box<dyn Classifier>;
}

impl Clone for Box<dyn Classifier> {
    fn clone(&self) -> Self {
        self.clone_box()
    }
}

/// Produces a new training view from a dataset.
pub trait Resampler: Send + Sync + Debug {
    /// Draw the resampled dataset. Instance weights of the input act as
    /// sampling bias where the strategy supports it.
    fn resample(&self, dataset: &Dataset, rng: &mut StdRng) -> Result<Dataset>;

    /// Short name used in log lines.
    fn name(&self) -> &'static str;
}
