//! Class-balanced evaluation metrics.
//!
//! All metrics are built on per-class true-positive counts ([`ClassCounts`]).
//! Classes with no rows in the evaluated data are skipped rather than
//! treated as zero recall, so a fold that happens to miss a class is not
//! scored as a total failure.

use crate::core::error::{RebalanceError, Result};
use crate::core::math::normalized_entropy;
use crate::core::traits::Classifier;
use crate::core::types::ClassIndex;
use crate::dataset::Dataset;
use serde::{Deserialize, Serialize};

/// Per-class true positives and positives.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ClassCounts {
    /// Correctly classified rows per true class
    pub true_positives: Vec<usize>,
    /// Rows per true class
    pub positives: Vec<usize>,
}

impl ClassCounts {
    /// Zeroed counts for `num_classes` classes
    pub fn new(num_classes: usize) -> Self {
        ClassCounts {
            true_positives: vec![0; num_classes],
            positives: vec![0; num_classes],
        }
    }

    /// Number of classes
    pub fn num_classes(&self) -> usize {
        self.positives.len()
    }

    /// Record one row. A `None` prediction counts as a miss.
    pub fn record(&mut self, actual: ClassIndex, predicted: Option<ClassIndex>) {
        self.positives[actual] += 1;
        if predicted == Some(actual) {
            self.true_positives[actual] += 1;
        }
    }

    /// Add another tally of the same shape
    pub fn merge(&mut self, other: &ClassCounts) -> Result<()> {
        if other.num_classes() != self.num_classes() {
            return Err(RebalanceError::dimension_mismatch(
                format!("{} classes", self.num_classes()),
                format!("{} classes", other.num_classes()),
            ));
        }
        for i in 0..self.num_classes() {
            self.true_positives[i] += other.true_positives[i];
            self.positives[i] += other.positives[i];
        }
        Ok(())
    }

    /// Total rows recorded
    pub fn total(&self) -> usize {
        self.positives.iter().sum()
    }

    /// Fraction of all rows classified correctly
    pub fn accuracy(&self) -> f64 {
        let total = self.total();
        if total == 0 {
            return 0.0;
        }
        self.true_positives.iter().sum::<usize>() as f64 / total as f64
    }

    /// True-positive rate per class, `None` for classes without rows
    pub fn true_positive_rates(&self) -> Vec<Option<f64>> {
        self.true_positives
            .iter()
            .zip(&self.positives)
            .map(|(&tp, &p)| {
                if p == 0 {
                    None
                } else {
                    Some(tp as f64 / p as f64)
                }
            })
            .collect()
    }

    fn present_rates(&self) -> Vec<f64> {
        self.true_positive_rates().into_iter().flatten().collect()
    }

    /// Geometric mean of per-class true-positive rates.
    pub fn geometric_mean_tpr(&self) -> f64 {
        let rates = self.present_rates();
        if rates.is_empty() {
            return 0.0;
        }
        let exponent = 1.0 / rates.len() as f64;
        rates.iter().map(|&r| r.powf(exponent)).product()
    }

    /// Arithmetic mean of per-class true-positive rates.
    pub fn arithmetic_mean_tpr(&self) -> f64 {
        let rates = self.present_rates();
        if rates.is_empty() {
            return 0.0;
        }
        rates.iter().sum::<f64>() / rates.len() as f64
    }

    /// Mean `|TPR_i - TPR_j|` over unordered pairs of present classes.
    pub fn mean_pairwise_tpr_gap(&self) -> f64 {
        let rates = self.present_rates();
        let mut sum = 0.0;
        let mut pairs = 0usize;
        for i in 0..rates.len() {
            for j in (i + 1)..rates.len() {
                sum += (rates[i] - rates[j]).abs();
                pairs += 1;
            }
        }
        if pairs == 0 {
            0.0
        } else {
            sum / pairs as f64
        }
    }

    /// TPR gap weighted by `p_i * p_j`, with `p` the class frequencies of
    /// the evaluated rows.
    pub fn weighted_imbalance(&self) -> f64 {
        let total = self.total() as f64;
        if total == 0.0 {
            return 0.0;
        }
        let rates = self.true_positive_rates();
        let mut numerator = 0.0;
        let mut denominator = 0.0;
        for i in 0..rates.len() {
            for j in 0..rates.len() {
                if let (true, Some(ri), Some(rj)) = (i != j, rates[i], rates[j]) {
                    let weight = self.positives[i] as f64 / total * self.positives[j] as f64 / total;
                    numerator += weight * (ri - rj).abs();
                    denominator += weight;
                }
            }
        }
        if denominator == 0.0 {
            0.0
        } else {
            numerator / denominator
        }
    }

    /// Score maximized by the rebalance-parameter search:
    /// `w * (1 - mean pairwise gap) + (1 - w) * geometric mean`.
    pub fn tuning_score(&self, fairness_weight: f64) -> f64 {
        fairness_weight * (1.0 - self.mean_pairwise_tpr_gap())
            + (1.0 - fairness_weight) * self.geometric_mean_tpr()
    }
}

/// Summary of class-balanced metrics for one evaluation.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ImbalanceMetrics {
    /// Overall accuracy
    pub accuracy: f64,
    /// Per-class true-positive rate, `None` for absent classes
    pub per_class_tpr: Vec<Option<f64>>,
    /// Geometric mean of TPRs
    pub geometric_mean: f64,
    /// Arithmetic mean of TPRs
    pub arithmetic_mean: f64,
    /// Frequency-weighted mean TPR gap
    pub imbalance: f64,
}

impl From<&ClassCounts> for ImbalanceMetrics {
    fn from(counts: &ClassCounts) -> Self {
        ImbalanceMetrics {
            accuracy: counts.accuracy(),
            per_class_tpr: counts.true_positive_rates(),
            geometric_mean: counts.geometric_mean_tpr(),
            arithmetic_mean: counts.arithmetic_mean_tpr(),
            imbalance: counts.weighted_imbalance(),
        }
    }
}

/// Tally predictions of `classifier` over every row of `dataset`.
pub fn evaluate_classifier(classifier: &dyn Classifier, dataset: &Dataset) -> Result<ClassCounts> {
    let mut counts = ClassCounts::new(dataset.num_classes());
    for instance in dataset.iter() {
        let predicted = classifier.predict_label(&instance.features)?;
        counts.record(instance.label, predicted);
    }
    Ok(counts)
}

/// Mean entropy gained by `classifier` over `base` on rows where `base`
/// is correct.
///
/// Rows the base classifier gets wrong contribute nothing, but still count
/// toward the mean. Positive values mean the classifier became less
/// certain where the base was already right.
pub fn information_loss(
    classifier: &dyn Classifier,
    base: &dyn Classifier,
    dataset: &Dataset,
) -> Result<f64> {
    if dataset.is_empty() {
        return Ok(0.0);
    }
    let mut gain = 0.0;
    for instance in dataset.iter() {
        let base_distribution = base.predict_distribution(&instance.features)?;
        if crate::core::math::argmax(&base_distribution) != Some(instance.label) {
            continue;
        }
        let distribution = classifier.predict_distribution(&instance.features)?;
        gain += normalized_entropy(&distribution) - normalized_entropy(&base_distribution);
    }
    Ok(gain / dataset.num_instances() as f64)
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_abs_diff_eq;

    fn counts(tp: &[usize], p: &[usize]) -> ClassCounts {
        ClassCounts {
            true_positives: tp.to_vec(),
            positives: p.to_vec(),
        }
    }

    #[test]
    fn test_rates_and_means() {
        let c = counts(&[9, 1], &[10, 4]);
        let rates = c.true_positive_rates();
        assert_eq!(rates, vec![Some(0.9), Some(0.25)]);
        assert_abs_diff_eq!(c.geometric_mean_tpr(), (0.9f64 * 0.25).sqrt(), epsilon = 1e-12);
        assert_abs_diff_eq!(c.arithmetic_mean_tpr(), 0.575, epsilon = 1e-12);
        assert_abs_diff_eq!(c.mean_pairwise_tpr_gap(), 0.65, epsilon = 1e-12);
        assert_abs_diff_eq!(c.accuracy(), 10.0 / 14.0, epsilon = 1e-12);
    }

    #[test]
    fn test_absent_class_is_skipped() {
        let c = counts(&[5, 0, 5], &[5, 0, 10]);
        assert_eq!(c.true_positive_rates()[1], None);
        assert_abs_diff_eq!(c.geometric_mean_tpr(), 0.5f64.sqrt(), epsilon = 1e-12);
    }

    #[test]
    fn test_zero_recall_zeroes_geometric_mean() {
        let c = counts(&[10, 0], &[10, 3]);
        assert_eq!(c.geometric_mean_tpr(), 0.0);
        assert_abs_diff_eq!(c.arithmetic_mean_tpr(), 0.5);
    }

    #[test]
    fn test_weighted_imbalance() {
        let c = counts(&[8, 1], &[8, 2]);
        // Only one unordered pair, so the weighting cancels.
        assert_abs_diff_eq!(c.weighted_imbalance(), 0.5, epsilon = 1e-12);
        let balanced = counts(&[3, 3], &[3, 3]);
        assert_eq!(balanced.weighted_imbalance(), 0.0);
    }

    #[test]
    fn test_tuning_score_extremes() {
        let perfect = counts(&[4, 4], &[4, 4]);
        assert_abs_diff_eq!(perfect.tuning_score(0.2), 1.0, epsilon = 1e-12);
        let majority_only = counts(&[4, 0], &[4, 4]);
        assert_abs_diff_eq!(majority_only.tuning_score(0.2), 0.0, epsilon = 1e-12);
    }

    #[test]
    fn test_merge_and_record() {
        let mut a = ClassCounts::new(2);
        a.record(0, Some(0));
        a.record(1, None);
        let mut b = ClassCounts::new(2);
        b.record(1, Some(1));
        a.merge(&b).unwrap();
        assert_eq!(a.true_positives, vec![1, 1]);
        assert_eq!(a.positives, vec![1, 2]);
        assert!(a.merge(&ClassCounts::new(3)).is_err());
    }

    #[test]
    fn test_metrics_summary() {
        let summary = ImbalanceMetrics::from(&counts(&[2, 1], &[2, 2]));
        assert_abs_diff_eq!(summary.arithmetic_mean, 0.75);
        assert_abs_diff_eq!(summary.accuracy, 0.75);
    }
}
