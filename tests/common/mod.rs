//! Common test utilities for imbalance-boost integration tests.

#![allow(dead_code)]

use imbalance_boost::*;
use ndarray::{Array2, ArrayView1};
use rand::prelude::*;

/// Returns the same distribution for every row.
#[derive(Debug, Clone)]
pub struct ConstantClassifier {
    pub distribution: Vec<f64>,
}

impl ConstantClassifier {
    pub fn new(distribution: Vec<f64>) -> Self {
        ConstantClassifier { distribution }
    }
}

impl Classifier for ConstantClassifier {
    fn train(&mut self, _dataset: &Dataset) -> Result<()> {
        Ok(())
    }

    fn predict_distribution(&self, _features: &ArrayView1<'_, f64>) -> Result<Vec<f64>> {
        Ok(self.distribution.clone())
    }

    fn name(&self) -> &'static str {
        "ConstantClassifier"
    }

    fn clone_box(&self) -> Box<dyn Classifier> {
        Box::new(self.clone())
    }
}

/// Reads the label from feature 0 and predicts it with certainty.
#[derive(Debug, Clone)]
pub struct OracleClassifier {
    pub num_classes: usize,
}

impl Classifier for OracleClassifier {
    fn train(&mut self, dataset: &Dataset) -> Result<()> {
        self.num_classes = dataset.num_classes();
        Ok(())
    }

    fn predict_distribution(&self, features: &ArrayView1<'_, f64>) -> Result<Vec<f64>> {
        let mut distribution = vec![0.0; self.num_classes];
        distribution[features[0] as usize] = 1.0;
        Ok(distribution)
    }

    fn name(&self) -> &'static str {
        "OracleClassifier"
    }

    fn clone_box(&self) -> Box<dyn Classifier> {
        Box::new(self.clone())
    }
}

/// Maps feature 0, read as an integer key, to a fixed distribution.
#[derive(Debug, Clone)]
pub struct LookupClassifier {
    pub table: Vec<Vec<f64>>,
}

impl Classifier for LookupClassifier {
    fn train(&mut self, _dataset: &Dataset) -> Result<()> {
        Ok(())
    }

    fn predict_distribution(&self, features: &ArrayView1<'_, f64>) -> Result<Vec<f64>> {
        Ok(self.table[features[0] as usize].clone())
    }

    fn name(&self) -> &'static str {
        "LookupClassifier"
    }

    fn clone_box(&self) -> Box<dyn Classifier> {
        Box::new(self.clone())
    }
}

/// Weighted nearest-centroid classifier with a softmax over negative
/// squared distances. Classes without weight get probability 0.
#[derive(Debug, Clone, Default)]
pub struct NearestCentroid {
    centroids: Vec<Option<Vec<f64>>>,
}

impl Classifier for NearestCentroid {
    fn train(&mut self, dataset: &Dataset) -> Result<()> {
        let k = dataset.num_classes();
        let d = dataset.num_features();
        let mut sums = vec![vec![0.0; d]; k];
        let mut totals = vec![0.0; k];
        for instance in dataset.iter() {
            for (sum, &x) in sums[instance.label].iter_mut().zip(instance.features.iter()) {
                *sum += instance.weight * x;
            }
            totals[instance.label] += instance.weight;
        }
        self.centroids = sums
            .into_iter()
            .zip(totals)
            .map(|(sum, total)| {
                if total > 0.0 {
                    Some(sum.into_iter().map(|s| s / total).collect())
                } else {
                    None
                }
            })
            .collect();
        Ok(())
    }

    fn predict_distribution(&self, features: &ArrayView1<'_, f64>) -> Result<Vec<f64>> {
        let distances: Vec<Option<f64>> = self
            .centroids
            .iter()
            .map(|centroid| {
                centroid.as_ref().map(|c| {
                    c.iter()
                        .zip(features.iter())
                        .map(|(a, b)| (a - b) * (a - b))
                        .sum::<f64>()
                })
            })
            .collect();
        let nearest = distances
            .iter()
            .flatten()
            .fold(f64::INFINITY, |acc, &d| acc.min(d));
        let mut distribution: Vec<f64> = distances
            .iter()
            .map(|d| d.map_or(0.0, |d| (nearest - d).exp()))
            .collect();
        let sum: f64 = distribution.iter().sum();
        if sum > 0.0 {
            distribution.iter_mut().for_each(|p| *p /= sum);
        }
        Ok(distribution)
    }

    fn name(&self) -> &'static str {
        "NearestCentroid"
    }

    fn clone_box(&self) -> Box<dyn Classifier> {
        Box::new(self.clone())
    }
}

/// Two-feature blobs: class `c` is centered at `(3c, 3c)`
/// with uniform noise in `[-1, 1)`.
pub fn create_blobs(counts: &[usize], seed: u64) -> Dataset {
    let mut rng = StdRng::seed_from_u64(seed);
    let mut rows = Vec::new();
    let mut labels = Vec::new();
    for (class, &count) in counts.iter().enumerate() {
        for _ in 0..count {
            let center = 3.0 * class as f64;
            rows.push(vec![
                center + rng.gen_range(-1.0..1.0),
                center + rng.gen_range(-1.0..1.0),
            ]);
            labels.push(class);
        }
    }
    Dataset::from_rows(&rows, labels, counts.len()).unwrap()
}

/// Dataset whose only feature is the label, for [`OracleClassifier`].
pub fn create_oracle_dataset(counts: &[usize]) -> Dataset {
    let labels: Vec<usize> = counts
        .iter()
        .enumerate()
        .flat_map(|(class, &count)| std::iter::repeat(class).take(count))
        .collect();
    let features = Array2::from_shape_fn((labels.len(), 1), |(i, _)| labels[i] as f64);
    Dataset::new(features, labels, counts.len()).unwrap()
}

/// Dataset with a single feature holding a key per row and the given labels.
pub fn create_keyed_dataset(keys: &[usize], labels: Vec<usize>, num_classes: usize) -> Dataset {
    let features = Array2::from_shape_fn((keys.len(), 1), |(i, _)| keys[i] as f64);
    Dataset::new(features, labels, num_classes).unwrap()
}

/// Assert two distributions agree entry by entry.
pub fn assert_distributions_close(actual: &[f64], expected: &[f64], epsilon: f64) {
    assert_eq!(actual.len(), expected.len());
    for (a, e) in actual.iter().zip(expected) {
        assert!(
            (a - e).abs() <= epsilon,
            "distributions differ: {:?} vs {:?}",
            actual,
            expected
        );
    }
}
