//! Cross-validated evaluation of classifiers.
//!
//! This module provides k-fold cross-validation over a [`Dataset`], used by
//! the rebalance-parameter search to score candidates on held-out rows, and
//! available on its own for comparing classifiers under class imbalance.

use crate::core::constants::{DEFAULT_NUM_FOLDS, DEFAULT_RANDOM_SEED};
use crate::core::error::{RebalanceError, Result, TrainingError};
use crate::core::traits::Classifier;
use crate::dataset::Dataset;
use crate::metrics_eval::{evaluate_classifier, ClassCounts, ImbalanceMetrics};
use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use rand::SeedableRng;
use serde::{Deserialize, Serialize};

/// Cross-validation configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CrossValidationConfig {
    /// Number of folds
    pub num_folds: usize,
    /// Whether to keep class proportions equal across folds
    pub stratified: bool,
    /// Whether to shuffle data before assigning folds
    pub shuffle: bool,
    /// Random seed for reproducibility
    pub random_seed: Option<u64>,
}

impl CrossValidationConfig {
    /// Create a new cross-validation configuration
    pub fn new() -> Self {
        Self {
            num_folds: DEFAULT_NUM_FOLDS,
            stratified: true,
            shuffle: true,
            random_seed: None,
        }
    }

    /// Set the number of folds
    pub fn with_num_folds(mut self, num_folds: usize) -> Self {
        self.num_folds = num_folds;
        self
    }

    /// Set whether to use stratified sampling
    pub fn with_stratified(mut self, stratified: bool) -> Self {
        self.stratified = stratified;
        self
    }

    /// Set whether to shuffle data
    pub fn with_shuffle(mut self, shuffle: bool) -> Self {
        self.shuffle = shuffle;
        self
    }

    /// Set random seed
    pub fn with_random_seed(mut self, seed: u64) -> Self {
        self.random_seed = Some(seed);
        self
    }

    /// Validate the configuration
    pub fn validate(&self) -> Result<()> {
        if self.num_folds < 2 {
            return Err(RebalanceError::invalid_parameter(
                "num_folds",
                self.num_folds.to_string(),
                "cross-validation needs at least 2 folds",
            ));
        }
        Ok(())
    }
}

impl Default for CrossValidationConfig {
    fn default() -> Self {
        Self::new()
    }
}

/// Cross-validation results
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CrossValidationResult {
    /// Number of folds used
    pub num_folds: usize,
    /// Held-out counts by fold
    pub fold_counts: Vec<ClassCounts>,
    /// Held-out counts summed over folds
    pub aggregate: ClassCounts,
}

impl CrossValidationResult {
    /// Class-balanced metrics of the aggregate counts
    pub fn metrics(&self) -> ImbalanceMetrics {
        ImbalanceMetrics::from(&self.aggregate)
    }
}

/// Assign every row of `dataset` to one of `config.num_folds` folds.
///
/// Stratified assignment deals each class's rows round-robin so class
/// proportions match across folds.
pub fn assign_folds(dataset: &Dataset, config: &CrossValidationConfig) -> Vec<usize> {
    let mut rng = StdRng::seed_from_u64(config.random_seed.unwrap_or(DEFAULT_RANDOM_SEED));
    let groups = if config.stratified {
        dataset.indices_by_class()
    } else {
        vec![(0..dataset.num_instances()).collect()]
    };

    let mut folds = vec![0; dataset.num_instances()];
    let mut next = 0;
    for mut group in groups {
        if config.shuffle {
            group.shuffle(&mut rng);
        }
        for index in group {
            folds[index] = next % config.num_folds;
            next += 1;
        }
    }
    folds
}

/// Train a fresh clone of `classifier` on each fold's complement and tally
/// its predictions on the held-out fold.
///
/// The input classifier is never trained. Empty held-out folds are skipped.
pub fn cross_validate(
    classifier: &dyn Classifier,
    dataset: &Dataset,
    config: &CrossValidationConfig,
) -> Result<CrossValidationResult> {
    config.validate()?;
    if dataset.num_instances() < config.num_folds {
        return Err(TrainingError::InsufficientData {
            required: config.num_folds,
            actual: dataset.num_instances(),
        }
        .into());
    }

    let folds = assign_folds(dataset, config);
    let mut fold_counts = Vec::with_capacity(config.num_folds);
    let mut aggregate = ClassCounts::new(dataset.num_classes());

    for fold in 0..config.num_folds {
        let (test, train): (Vec<usize>, Vec<usize>) =
            (0..dataset.num_instances()).partition(|&i| folds[i] == fold);
        if test.is_empty() {
            continue;
        }

        let mut model = classifier.clone_box();
        model.train(&dataset.subset(&train)?)?;
        let counts = evaluate_classifier(model.as_ref(), &dataset.subset(&test)?)?;
        log::trace!(
            "Fold {}/{}: accuracy {:.4} on {} rows",
            fold + 1,
            config.num_folds,
            counts.accuracy(),
            test.len()
        );
        aggregate.merge(&counts)?;
        fold_counts.push(counts);
    }

    Ok(CrossValidationResult {
        num_folds: config.num_folds,
        fold_counts,
        aggregate,
    })
}
