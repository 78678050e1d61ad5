//! Per-class multiplicative output weights learned from training errors.

use crate::core::constants::ADAPTIVE_WEIGHT_ITERATIONS;
use crate::core::error::{DatasetError, RebalanceError, Result};
use crate::core::math::{argmax, normalize};
use crate::core::traits::Classifier;
use crate::dataset::Dataset;
use ndarray::ArrayView1;

/// Wraps a base classifier and multiplies its output by one learned weight
/// per class.
///
/// Weights start at `1 / prior` (normalized). Each iteration counts the
/// misclassified training rows of every class under the current weights
/// and adds `1 / (N * (1 + misses_i) * prior_i)` to weight `i`, then
/// renormalizes. Absent classes get weight zero.
#[derive(Debug, Clone)]
pub struct AdaptiveClassWeights {
    base: Box<dyn Classifier>,
    pretrained: bool,
    iterations: usize,
    weights: Option<Vec<f64>>,
}

impl AdaptiveClassWeights {
    /// Wrap `base`. A pretrained base is not retrained.
    pub fn new(base: Box<dyn Classifier>, pretrained: bool) -> Self {
        AdaptiveClassWeights {
            base,
            pretrained,
            iterations: ADAPTIVE_WEIGHT_ITERATIONS,
            weights: None,
        }
    }

    /// Set the number of refinement iterations
    pub fn with_iterations(mut self, iterations: usize) -> Self {
        self.iterations = iterations;
        self
    }

    /// Learned class weights, once trained
    pub fn weights(&self) -> Option<&[f64]> {
        self.weights.as_deref()
    }
}

fn apply(weights: &[f64], distribution: &mut [f64]) {
    for (value, weight) in distribution.iter_mut().zip(weights) {
        *value *= weight;
    }
    normalize(distribution);
}

impl Classifier for AdaptiveClassWeights {
    fn train(&mut self, dataset: &Dataset) -> Result<()> {
        if dataset.is_empty() {
            return Err(DatasetError::Empty.into());
        }
        if !self.pretrained {
            self.base.train(dataset)?;
        }

        let priors = dataset.priors();
        let inverse = |p: f64| if p > 0.0 { 1.0 / p } else { 0.0 };
        let mut weights: Vec<f64> = priors.as_slice().iter().map(|&p| inverse(p)).collect();
        normalize(&mut weights);

        let base_distributions = dataset
            .iter()
            .map(|instance| self.base.predict_distribution(&instance.features))
            .collect::<Result<Vec<_>>>()?;
        let n = dataset.num_instances() as f64;

        for _ in 0..self.iterations {
            let mut misses = vec![0usize; weights.len()];
            for (distribution, &label) in base_distributions.iter().zip(dataset.labels()) {
                let mut adjusted = distribution.clone();
                apply(&weights, &mut adjusted);
                if argmax(&adjusted) != Some(label) {
                    misses[label] += 1;
                }
            }
            for (i, weight) in weights.iter_mut().enumerate() {
                *weight += inverse(priors[i]) / n / (1 + misses[i]) as f64;
            }
            normalize(&mut weights);
        }

        log::debug!("Adaptive class weights: {:?}", weights);
        self.weights = Some(weights);
        Ok(())
    }

    fn predict_distribution(&self, features: &ArrayView1<'_, f64>) -> Result<Vec<f64>> {
        let weights = self
            .weights
            .as_ref()
            .ok_or_else(|| RebalanceError::not_trained("AdaptiveClassWeights"))?;
        let mut distribution = self.base.predict_distribution(features)?;
        if distribution.len() != weights.len() {
            return Err(RebalanceError::dimension_mismatch(
                format!("{} classes", weights.len()),
                format!("{} classes", distribution.len()),
            ));
        }
        apply(weights, &mut distribution);
        Ok(distribution)
    }

    fn name(&self) -> &'static str {
        "AdaptiveClassWeights"
    }

    fn clone_box(&self) -> Box<dyn Classifier> {
        Box::new(self.clone())
    }
}
