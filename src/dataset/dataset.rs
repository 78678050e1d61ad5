//! Labeled, weighted dataset used for training and evaluation.

use crate::core::error::{DatasetError, RebalanceError, Result};
use crate::core::types::ClassIndex;
use crate::dataset::priors::ClassPriors;
use crate::dataset_error;
use ndarray::{Array1, Array2, ArrayView1, ArrayView2, Axis};

/// Ordered rows of numeric features with a class label and a non-negative
/// weight each.
///
/// Construction enforces that every label lies in `[0, K)`, that features,
/// labels and weights agree in length and that every weight is finite and
/// non-negative. Datasets are never mutated by the components that read
/// them; resampling and reweighting always produce a new dataset.
#[derive(Debug, Clone, PartialEq)]
pub struct Dataset {
    /// Feature matrix (num_instances × num_features)
    features: Array2<f64>,
    /// Class label of each row
    labels: Vec<ClassIndex>,
    /// Instance weights, one by default
    weights: Array1<f64>,
    /// Number of classes K
    num_classes: usize,
    /// Optional feature names
    feature_names: Option<Vec<String>>,
}

/// Borrowed view of one dataset row.
#[derive(Debug, Clone, Copy)]
pub struct Instance<'a> {
    /// Feature vector
    pub features: ArrayView1<'a, f64>,
    /// Class label in `[0, K)`
    pub label: ClassIndex,
    /// Non-negative instance weight
    pub weight: f64,
}

impl Dataset {
    /// Create a dataset with unit weights.
    pub fn new(features: Array2<f64>, labels: Vec<ClassIndex>, num_classes: usize) -> Result<Self> {
        let weights = Array1::ones(features.nrows());
        Self::with_weights(features, labels, weights, num_classes)
    }

    /// Create a dataset with explicit instance weights.
    pub fn with_weights(
        features: Array2<f64>,
        labels: Vec<ClassIndex>,
        weights: Array1<f64>,
        num_classes: usize,
    ) -> Result<Self> {
        if num_classes == 0 {
            return Err(DatasetError::NoClasses { num_classes }.into());
        }
        if features.nrows() != labels.len() || labels.len() != weights.len() {
            return Err(DatasetError::RowCountMismatch {
                features: features.nrows(),
                labels: labels.len(),
                weights: weights.len(),
            }
            .into());
        }
        if let Some((index, &label)) = labels.iter().enumerate().find(|&(_, &l)| l >= num_classes) {
            return Err(DatasetError::LabelOutOfRange {
                index,
                label,
                num_classes,
            }
            .into());
        }
        if let Some((index, &value)) = weights
            .iter()
            .enumerate()
            .find(|&(_, &w)| !w.is_finite() || w < 0.0)
        {
            return Err(DatasetError::InvalidWeight { index, value }.into());
        }

        Ok(Dataset {
            features,
            labels,
            weights,
            num_classes,
            feature_names: None,
        })
    }

    /// Create a dataset from row vectors.
    pub fn from_rows(rows: &[Vec<f64>], labels: Vec<ClassIndex>, num_classes: usize) -> Result<Self> {
        let num_features = rows.first().map_or(0, |row| row.len());
        if let Some(row) = rows.iter().find(|row| row.len() != num_features) {
            return Err(DatasetError::FeatureMismatch {
                expected: num_features,
                actual: row.len(),
            }
            .into());
        }
        let flat: Vec<f64> = rows.iter().flatten().copied().collect();
        let features = Array2::from_shape_vec((rows.len(), num_features), flat)
            .map_err(|e| dataset_error!("Failed to shape feature rows: {}", e))?;
        Self::new(features, labels, num_classes)
    }

    /// Create an empty dataset with the given shape metadata.
    pub fn empty(num_features: usize, num_classes: usize) -> Result<Self> {
        Self::new(Array2::zeros((0, num_features)), Vec::new(), num_classes)
    }

    /// Get a dataset builder
    pub fn builder() -> DatasetBuilder {
        DatasetBuilder::new()
    }

    /// Number of rows
    pub fn num_instances(&self) -> usize {
        self.labels.len()
    }

    /// Number of feature columns
    pub fn num_features(&self) -> usize {
        self.features.ncols()
    }

    /// Number of classes K
    pub fn num_classes(&self) -> usize {
        self.num_classes
    }

    /// Whether the dataset has no rows
    pub fn is_empty(&self) -> bool {
        self.labels.is_empty()
    }

    /// Feature matrix view
    pub fn features(&self) -> ArrayView2<'_, f64> {
        self.features.view()
    }

    /// Feature row `index`
    pub fn row(&self, index: usize) -> ArrayView1<'_, f64> {
        self.features.row(index)
    }

    /// All labels
    pub fn labels(&self) -> &[ClassIndex] {
        &self.labels
    }

    /// Label of row `index`
    pub fn label(&self, index: usize) -> ClassIndex {
        self.labels[index]
    }

    /// Instance weights
    pub fn weights(&self) -> ArrayView1<'_, f64> {
        self.weights.view()
    }

    /// Weight of row `index`
    pub fn weight(&self, index: usize) -> f64 {
        self.weights[index]
    }

    /// Sum of instance weights
    pub fn total_weight(&self) -> f64 {
        self.weights.sum()
    }

    /// Feature names, if any were attached
    pub fn feature_names(&self) -> Option<&[String]> {
        self.feature_names.as_deref()
    }

    /// Borrowed view of row `index`
    pub fn instance(&self, index: usize) -> Instance<'_> {
        Instance {
            features: self.features.row(index),
            label: self.labels[index],
            weight: self.weights[index],
        }
    }

    /// Iterate over all rows in order
    pub fn iter(&self) -> impl Iterator<Item = Instance<'_>> + '_ {
        (0..self.num_instances()).map(move |i| self.instance(i))
    }

    /// Number of rows per class
    pub fn class_counts(&self) -> Vec<usize> {
        let mut counts = vec![0; self.num_classes];
        for &label in &self.labels {
            counts[label] += 1;
        }
        counts
    }

    /// Row indices grouped by class
    pub fn indices_by_class(&self) -> Vec<Vec<usize>> {
        let mut groups = vec![Vec::new(); self.num_classes];
        for (index, &label) in self.labels.iter().enumerate() {
            groups[label].push(index);
        }
        groups
    }

    /// Observed class frequencies
    pub fn priors(&self) -> ClassPriors {
        ClassPriors::from_dataset(self)
    }

    /// Copy of the rows at `indices`, in the given order, keeping their weights.
    pub fn subset(&self, indices: &[usize]) -> Result<Self> {
        if let Some(&bad) = indices.iter().find(|&&i| i >= self.num_instances()) {
            return Err(RebalanceError::index_out_of_bounds(bad, self.num_instances()));
        }

        let features = self.features.select(Axis(0), indices);
        let labels = indices.iter().map(|&i| self.labels[i]).collect();
        let weights = indices.iter().map(|&i| self.weights[i]).collect();

        Ok(Dataset {
            features,
            labels,
            weights,
            num_classes: self.num_classes,
            feature_names: self.feature_names.clone(),
        })
    }

    /// Same rows with new instance weights.
    pub fn reweighted(&self, weights: Array1<f64>) -> Result<Self> {
        let mut dataset = Self::with_weights(
            self.features.clone(),
            self.labels.clone(),
            weights,
            self.num_classes,
        )?;
        dataset.feature_names = self.feature_names.clone();
        Ok(dataset)
    }

    /// Append rows, producing a new dataset.
    pub fn extended(&self, rows: &[Vec<f64>], labels: &[ClassIndex], weights: &[f64]) -> Result<Self> {
        if rows.len() != labels.len() || labels.len() != weights.len() {
            return Err(DatasetError::RowCountMismatch {
                features: rows.len(),
                labels: labels.len(),
                weights: weights.len(),
            }
            .into());
        }
        let mut features = self.features.clone();
        for row in rows {
            if row.len() != self.num_features() {
                return Err(DatasetError::FeatureMismatch {
                    expected: self.num_features(),
                    actual: row.len(),
                }
                .into());
            }
            features
                .push_row(ArrayView1::from(row.as_slice()))
                .map_err(|e| dataset_error!("Failed to append row: {}", e))?;
        }
        let mut all_labels = self.labels.clone();
        all_labels.extend_from_slice(labels);
        let mut all_weights = self.weights.to_vec();
        all_weights.extend_from_slice(weights);

        let mut dataset =
            Self::with_weights(features, all_labels, Array1::from(all_weights), self.num_classes)?;
        dataset.feature_names = self.feature_names.clone();
        Ok(dataset)
    }
}

/// Dataset builder for constructing datasets with validation
#[derive(Debug, Default)]
pub struct DatasetBuilder {
    features: Option<Array2<f64>>,
    labels: Option<Vec<ClassIndex>>,
    weights: Option<Array1<f64>>,
    num_classes: Option<usize>,
    feature_names: Option<Vec<String>>,
}

impl DatasetBuilder {
    /// Create a new dataset builder
    pub fn new() -> Self {
        Self::default()
    }

    /// Set features
    pub fn features(mut self, features: Array2<f64>) -> Self {
        self.features = Some(features);
        self
    }

    /// Set labels
    pub fn labels(mut self, labels: Vec<ClassIndex>) -> Self {
        self.labels = Some(labels);
        self
    }

    /// Set weights
    pub fn weights(mut self, weights: Array1<f64>) -> Self {
        self.weights = Some(weights);
        self
    }

    /// Set the number of classes. Defaults to one more than the largest label.
    pub fn num_classes(mut self, num_classes: usize) -> Self {
        self.num_classes = Some(num_classes);
        self
    }

    /// Set feature names
    pub fn feature_names(mut self, names: Vec<String>) -> Self {
        self.feature_names = Some(names);
        self
    }

    /// Build the dataset
    pub fn build(self) -> Result<Dataset> {
        let features = self
            .features
            .ok_or_else(|| RebalanceError::dataset("Features are required"))?;
        let labels = self
            .labels
            .ok_or_else(|| RebalanceError::dataset("Labels are required"))?;
        let num_classes = self
            .num_classes
            .unwrap_or_else(|| labels.iter().max().map_or(0, |&max| max + 1));
        let weights = self.weights.unwrap_or_else(|| Array1::ones(labels.len()));

        if let Some(ref names) = self.feature_names {
            if names.len() != features.ncols() {
                return Err(DatasetError::FeatureMismatch {
                    expected: features.ncols(),
                    actual: names.len(),
                }
                .into());
            }
        }

        let mut dataset = Dataset::with_weights(features, labels, weights, num_classes)?;
        dataset.feature_names = self.feature_names;
        Ok(dataset)
    }
}
