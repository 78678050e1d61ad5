//! Boosting policies: how members are produced and what each round trains on.

use crate::config::{BoostingConfig, RebalanceConfig};
use crate::config_error;
use crate::core::constants::KMEANS_MAX_ITERATIONS;
use crate::core::error::{DatasetError, RebalanceError, Result};
use crate::core::math::squared_distance;
use crate::core::traits::{Classifier, Resampler};
use crate::core::types::{FunctionForm, RebalanceParameter};
use crate::dataset::{Dataset, SpreadSubsample};
use crate::rebalance::RebalancingWrapper;
use ndarray::{Array1, ArrayView1};
use rand::rngs::StdRng;
use rand::Rng;
use std::fmt::Debug;

/// Specialization points of a [`BoostedEnsemble`](super::BoostedEnsemble).
pub trait BoostingPolicy: Send + Sync + Debug {
    /// Untrained member for round `index` of `total`.
    fn produce_member(&self, index: usize, total: usize) -> Result<Box<dyn Classifier>>;

    /// Training view for round `index`. `distribution` holds the current
    /// sample distribution over the rows of `dataset`.
    fn generate_round_dataset(
        &self,
        dataset: &Dataset,
        distribution: &[f64],
        index: usize,
        total: usize,
        rng: &mut StdRng,
    ) -> Result<Dataset>;

    /// Number of rounds to run on `dataset`.
    ///
    /// Called once per training run, before the first round, with the run's
    /// random source. Policies that derive per-run state from the data
    /// build it here.
    fn calculate_member_count(&mut self, dataset: &Dataset, rng: &mut StdRng) -> Result<usize>;

    /// Whether a round only extends the ensemble when it improves on the
    /// best performance so far.
    fn keep_only_favorable_rounds(&self) -> bool;

    /// Short name used in log lines.
    fn name(&self) -> &'static str;
}

fn weighted_by(dataset: &Dataset, distribution: &[f64]) -> Result<Dataset> {
    dataset.reweighted(Array1::from(distribution.to_vec()))
}

/// Clones of one base classifier, each trained on a spread-subsampled view
/// drawn in proportion to the sample distribution. Every round extends the
/// ensemble.
#[derive(Debug, Clone)]
pub struct UniformResamplingPolicy {
    base: Box<dyn Classifier>,
    num_members: usize,
    subsample: SpreadSubsample,
}

impl UniformResamplingPolicy {
    /// Policy cloning `base` for `config.num_members` rounds.
    pub fn new(base: Box<dyn Classifier>, config: &BoostingConfig) -> Result<Self> {
        config.validate()?;
        Ok(UniformResamplingPolicy {
            base,
            num_members: config.num_members,
            subsample: SpreadSubsample::new(config.max_spread)?,
        })
    }
}

impl BoostingPolicy for UniformResamplingPolicy {
    fn produce_member(&self, _index: usize, _total: usize) -> Result<Box<dyn Classifier>> {
        Ok(self.base.clone_box())
    }

    fn generate_round_dataset(
        &self,
        dataset: &Dataset,
        distribution: &[f64],
        _index: usize,
        _total: usize,
        rng: &mut StdRng,
    ) -> Result<Dataset> {
        self.subsample.resample(&weighted_by(dataset, distribution)?, rng)
    }

    fn calculate_member_count(&mut self, _dataset: &Dataset, _rng: &mut StdRng) -> Result<usize> {
        Ok(self.num_members)
    }

    fn keep_only_favorable_rounds(&self) -> bool {
        false
    }

    fn name(&self) -> &'static str {
        "uniform_resampling"
    }
}

/// Linear-form rebalancing wrappers around clones of one base classifier,
/// with the parameter rising as `2t / T` over the rounds. Every round trains
/// on the full dataset weighted by the sample distribution, and only rounds
/// that improve performance extend the ensemble.
#[derive(Debug, Clone)]
pub struct RebalanceSweepPolicy {
    base: Box<dyn Classifier>,
    num_members: usize,
}

impl RebalanceSweepPolicy {
    /// Policy wrapping `base` for `config.num_members` rounds.
    pub fn new(base: Box<dyn Classifier>, config: &BoostingConfig) -> Result<Self> {
        config.validate()?;
        Ok(RebalanceSweepPolicy {
            base,
            num_members: config.num_members,
        })
    }

    /// Rebalance parameter of round `index` of `total`.
    pub fn parameter_for(index: usize, total: usize) -> f64 {
        2.0 * index as f64 / total as f64
    }
}

impl BoostingPolicy for RebalanceSweepPolicy {
    fn produce_member(&self, index: usize, total: usize) -> Result<Box<dyn Classifier>> {
        let config = RebalanceConfig {
            function_form: FunctionForm::Linear,
            rebalance_parameter: RebalanceParameter::Fixed(Self::parameter_for(index, total)),
            ..RebalanceConfig::passthrough()
        };
        Ok(Box::new(RebalancingWrapper::new(self.base.clone_box(), config)?))
    }

    fn generate_round_dataset(
        &self,
        dataset: &Dataset,
        distribution: &[f64],
        _index: usize,
        _total: usize,
        _rng: &mut StdRng,
    ) -> Result<Dataset> {
        weighted_by(dataset, distribution)
    }

    fn calculate_member_count(&mut self, _dataset: &Dataset, _rng: &mut StdRng) -> Result<usize> {
        Ok(self.num_members)
    }

    fn keep_only_favorable_rounds(&self) -> bool {
        true
    }

    fn name(&self) -> &'static str {
        "rebalance_sweep"
    }
}

/// Clones of one base classifier, each trained on one k-means cluster of
/// the majority class together with every minority row.
///
/// Binary problems only. The majority class is split into
/// `ceil(n_majority / n_minority)` clusters, the member count is the number
/// of non-empty clusters, and only rounds that improve performance extend
/// the ensemble.
#[derive(Debug, Clone)]
pub struct ClusterPolicy {
    base: Box<dyn Classifier>,
    clusters: Vec<Vec<usize>>,
    minority: Vec<usize>,
}

impl ClusterPolicy {
    /// Policy cloning `base` once per majority cluster.
    pub fn new(base: Box<dyn Classifier>, config: &BoostingConfig) -> Result<Self> {
        config.validate()?;
        Ok(ClusterPolicy {
            base,
            clusters: Vec::new(),
            minority: Vec::new(),
        })
    }

    /// Majority-class row indices of each cluster from the last run
    pub fn clusters(&self) -> &[Vec<usize>] {
        &self.clusters
    }

    fn build_clusters(&mut self, dataset: &Dataset, rng: &mut StdRng) -> Result<()> {
        if dataset.num_classes() != 2 {
            return Err(config_error!(
                "Clustered boosting needs a binary problem, got {} classes",
                dataset.num_classes()
            ));
        }
        let mut groups = dataset.indices_by_class();
        let (majority, minority) = if groups[0].len() < groups[1].len() {
            (1, 0)
        } else {
            (0, 1)
        };
        if groups[minority].is_empty() {
            return Err(DatasetError::MissingClass { class: minority }.into());
        }
        let minority_rows = std::mem::take(&mut groups[minority]);
        let majority_rows = std::mem::take(&mut groups[majority]);
        let count = (majority_rows.len() + minority_rows.len() - 1) / minority_rows.len();

        self.clusters = kmeans(dataset, &majority_rows, count, rng);
        self.minority = minority_rows;
        log::debug!(
            "Split {} rows of class {} into {} clusters (sizes {:?})",
            majority_rows.len(),
            majority,
            self.clusters.len(),
            self.clusters.iter().map(Vec::len).collect::<Vec<_>>()
        );
        Ok(())
    }
}

impl BoostingPolicy for ClusterPolicy {
    fn produce_member(&self, _index: usize, _total: usize) -> Result<Box<dyn Classifier>> {
        Ok(self.base.clone_box())
    }

    fn generate_round_dataset(
        &self,
        dataset: &Dataset,
        distribution: &[f64],
        index: usize,
        _total: usize,
        _rng: &mut StdRng,
    ) -> Result<Dataset> {
        let cluster = self
            .clusters
            .get(index)
            .ok_or_else(|| RebalanceError::index_out_of_bounds(index, self.clusters.len()))?;
        let mut indices: Vec<usize> = cluster.iter().chain(&self.minority).copied().collect();
        indices.sort_unstable();
        weighted_by(dataset, distribution)?.subset(&indices)
    }

    fn calculate_member_count(&mut self, dataset: &Dataset, rng: &mut StdRng) -> Result<usize> {
        self.build_clusters(dataset, rng)?;
        Ok(self.clusters.len())
    }

    fn keep_only_favorable_rounds(&self) -> bool {
        true
    }

    fn name(&self) -> &'static str {
        "cluster"
    }
}

/// Index and squared distance of the center closest to `point`, ties to the
/// lowest index.
fn nearest_center(centers: &[Array1<f64>], point: &ArrayView1<'_, f64>) -> (usize, f64) {
    let mut best = (0, f64::INFINITY);
    for (index, center) in centers.iter().enumerate() {
        let distance = squared_distance(&center.view(), point);
        if distance < best.1 {
            best = (index, distance);
        }
    }
    best
}

/// Partition `rows` of `dataset` into at most `k` non-empty clusters.
///
/// The first center is a random row and each further one is the row
/// farthest from the centers chosen so far. Lloyd passes then run until no
/// row changes cluster, up to [`KMEANS_MAX_ITERATIONS`]. Clusters left
/// empty are dropped.
pub fn kmeans(dataset: &Dataset, rows: &[usize], k: usize, rng: &mut StdRng) -> Vec<Vec<usize>> {
    if rows.is_empty() || k == 0 {
        return Vec::new();
    }
    let k = k.min(rows.len());
    let mut centers: Vec<Array1<f64>> = Vec::with_capacity(k);
    centers.push(dataset.row(rows[rng.gen_range(0..rows.len())]).to_owned());
    while centers.len() < k {
        let mut farthest = (rows[0], f64::NEG_INFINITY);
        for &row in rows {
            let (_, distance) = nearest_center(&centers, &dataset.row(row));
            if distance > farthest.1 {
                farthest = (row, distance);
            }
        }
        centers.push(dataset.row(farthest.0).to_owned());
    }

    let mut assignment = vec![usize::MAX; rows.len()];
    for pass in 0..KMEANS_MAX_ITERATIONS {
        let mut moved = 0;
        for (slot, &row) in assignment.iter_mut().zip(rows) {
            let (nearest, _) = nearest_center(&centers, &dataset.row(row));
            if *slot != nearest {
                *slot = nearest;
                moved += 1;
            }
        }
        log::trace!("k-means pass {}: {} rows moved", pass, moved);
        if moved == 0 {
            break;
        }

        let mut sums = vec![Array1::<f64>::zeros(dataset.num_features()); centers.len()];
        let mut sizes = vec![0usize; centers.len()];
        for (&cluster, &row) in assignment.iter().zip(rows) {
            sums[cluster] += &dataset.row(row);
            sizes[cluster] += 1;
        }
        for ((center, sum), &size) in centers.iter_mut().zip(sums).zip(&sizes) {
            if size > 0 {
                *center = sum / size as f64;
            }
        }
    }

    let mut clusters = vec![Vec::new(); centers.len()];
    for (&cluster, &row) in assignment.iter().zip(rows) {
        clusters[cluster].push(row);
    }
    clusters.retain(|members| !members.is_empty());
    clusters
}
