//! Class prior estimation.

use crate::core::types::ClassIndex;
use crate::dataset::Dataset;
use serde::{Deserialize, Serialize};
use std::ops::Index;

/// Observed class frequencies of a dataset.
///
/// Entries are non-negative and sum to one, or are all zero for an empty
/// dataset. Index `i` is the fraction of rows labeled `i`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ClassPriors {
    values: Vec<f64>,
}

impl ClassPriors {
    /// Estimate priors from a dataset's labels.
    pub fn from_dataset(dataset: &Dataset) -> Self {
        Self::from_labels(dataset.labels(), dataset.num_classes())
    }

    /// Estimate priors from raw labels.
    ///
    /// # Panics
    ///
    /// Panics if a label is not below `num_classes`.
    pub fn from_labels(labels: &[ClassIndex], num_classes: usize) -> Self {
        let mut counts = vec![0usize; num_classes];
        for &label in labels {
            counts[label] += 1;
        }
        Self::from_counts(&counts)
    }

    /// Priors from per-class counts.
    pub fn from_counts(counts: &[usize]) -> Self {
        let total: usize = counts.iter().sum();
        let values = if total == 0 {
            vec![0.0; counts.len()]
        } else {
            counts.iter().map(|&c| c as f64 / total as f64).collect()
        };
        ClassPriors { values }
    }

    /// Number of classes
    pub fn len(&self) -> usize {
        self.values.len()
    }

    /// Whether there are no classes at all
    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    /// Whether every prior is zero, as for an empty dataset
    pub fn is_degenerate(&self) -> bool {
        self.values.iter().all(|&p| p == 0.0)
    }

    /// Prior values by class
    pub fn as_slice(&self) -> &[f64] {
        &self.values
    }

    /// Prior of `class`, zero when out of range
    pub fn get(&self, class: ClassIndex) -> f64 {
        self.values.get(class).copied().unwrap_or(0.0)
    }

    /// Smallest prior, counting absent classes
    pub fn min(&self) -> f64 {
        let smallest = self.values.iter().copied().fold(f64::INFINITY, f64::min);
        if smallest.is_finite() {
            smallest
        } else {
            0.0
        }
    }

    /// Largest prior
    pub fn max(&self) -> f64 {
        self.values.iter().copied().fold(0.0, f64::max)
    }

    /// Index of the least frequent class that has at least one row
    pub fn minority_class(&self) -> Option<ClassIndex> {
        self.values
            .iter()
            .enumerate()
            .filter(|&(_, &p)| p > 0.0)
            .fold(None, |best: Option<(usize, f64)>, (i, &p)| match best {
                Some((_, current)) if p >= current => best,
                _ => Some((i, p)),
            })
            .map(|(i, _)| i)
    }

    /// Ratio of the largest to the smallest non-zero prior.
    ///
    /// One for a degenerate estimate.
    pub fn imbalance_ratio(&self) -> f64 {
        let smallest = self
            .values
            .iter()
            .copied()
            .filter(|&p| p > 0.0)
            .fold(f64::INFINITY, f64::min);
        if smallest.is_finite() {
            self.max() / smallest
        } else {
            1.0
        }
    }

    /// Mean ratio `p_i / p_j` over ordered pairs of distinct present classes.
    ///
    /// One for a perfectly balanced problem, growing with imbalance.
    pub fn mean_pairwise_ratio(&self) -> f64 {
        let mut sum = 0.0;
        let mut pairs = 0usize;
        for (i, &pi) in self.values.iter().enumerate() {
            for (j, &pj) in self.values.iter().enumerate() {
                if i != j && pi > 0.0 && pj > 0.0 {
                    sum += pi / pj;
                    pairs += 1;
                }
            }
        }
        if pairs == 0 {
            1.0
        } else {
            sum / pairs as f64
        }
    }
}

impl Index<ClassIndex> for ClassPriors {
    type Output = f64;

    fn index(&self, class: ClassIndex) -> &f64 {
        &self.values[class]
    }
}
