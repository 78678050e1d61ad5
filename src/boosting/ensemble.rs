//! Prior-aware boosted ensemble.

use super::policy::{BoostingPolicy, ClusterPolicy, RebalanceSweepPolicy, UniformResamplingPolicy};
use crate::config::BoostingConfig;
use crate::core::error::{DatasetError, RebalanceError, Result, TrainingError};
use crate::core::math::{argmax, normalize};
use crate::core::traits::Classifier;
use crate::dataset::{ClassPriors, Dataset};
use crate::metrics_eval::ClassCounts;
use ndarray::{Array1, ArrayView1};
use rand::rngs::StdRng;
use rand::SeedableRng;
use serde::{Deserialize, Serialize};

/// A trained member and its vote weight.
#[derive(Debug, Clone)]
pub struct EnsembleMember {
    /// The trained classifier
    pub classifier: Box<dyn Classifier>,
    /// Weight of its distribution in the combined prediction
    pub weight: f64,
}

/// What happened in one boosting round.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RoundSummary {
    /// Round index
    pub round: usize,
    /// Geometric mean of the member's per-class true-positive rates
    pub performance: f64,
    /// Normalized prior-weighted pseudo-loss, if it was computed
    pub pseudo_loss: Option<f64>,
    /// Member weight after the round
    pub member_weight: f64,
    /// Whether the round extended the effective ensemble
    pub retained: bool,
    /// Effective ensemble length after the round
    pub effective_length: usize,
}

/// Per-row outcome of evaluating one member on the full dataset.
struct RoundEvaluation {
    counts: ClassCounts,
    errors: Vec<f64>,
}

/// Ensemble trained by prior-aware adaptive boosting.
///
/// Each round trains a member on a view of the data produced by the policy,
/// scores it on the full dataset with a pseudo-loss in which every row
/// counts in proportion to its class prior, and shifts the sample
/// distribution toward rows the member got wrong. Members contribute to
/// predictions only up to the effective length, so trailing rounds that
/// did not help are ignored.
///
/// # Examples
///
/// ```rust,no_run
/// use imbalance_boost::*;
///
/// # fn example(base: Box<dyn Classifier>, dataset: &Dataset) -> Result<()> {
/// let config = BoostingConfig::builder().num_members(28).build()?;
/// let mut ensemble = BoostedEnsemble::uniform_resampling(base, config)?;
/// ensemble.train(dataset)?;
/// for round in ensemble.history() {
///     println!("round {}: performance {:.3}", round.round, round.performance);
/// }
/// # Ok(())
/// # }
/// ```
#[derive(Debug, Clone)]
pub struct BoostedEnsemble<P: BoostingPolicy> {
    policy: P,
    config: BoostingConfig,
    members: Vec<EnsembleMember>,
    effective_length: usize,
    history: Vec<RoundSummary>,
    num_classes: Option<usize>,
}

/// Spread-subsampling boosting with unconditional retention.
pub type UniformResamplingBoost = BoostedEnsemble<UniformResamplingPolicy>;

/// Rebalance-strength sweep boosting with best-prefix retention.
pub type RebalanceSweepBoost = BoostedEnsemble<RebalanceSweepPolicy>;

/// Majority-cluster boosting with best-prefix retention.
pub type ClusterBoost = BoostedEnsemble<ClusterPolicy>;

impl BoostedEnsemble<UniformResamplingPolicy> {
    /// Boost clones of `base` over spread-subsampled rounds.
    pub fn uniform_resampling(base: Box<dyn Classifier>, config: BoostingConfig) -> Result<Self> {
        let policy = UniformResamplingPolicy::new(base, &config)?;
        Self::new(policy, config)
    }
}

impl BoostedEnsemble<RebalanceSweepPolicy> {
    /// Boost linear rebalancing wrappers around `base` with a rising
    /// parameter.
    pub fn rebalance_sweep(base: Box<dyn Classifier>, config: BoostingConfig) -> Result<Self> {
        let policy = RebalanceSweepPolicy::new(base, &config)?;
        Self::new(policy, config)
    }
}

impl BoostedEnsemble<ClusterPolicy> {
    /// Boost clones of `base`, one per k-means cluster of the majority
    /// class. `config.num_members` is ignored; the cluster count decides.
    pub fn cluster(base: Box<dyn Classifier>, config: BoostingConfig) -> Result<Self> {
        let policy = ClusterPolicy::new(base, &config)?;
        Self::new(policy, config)
    }
}

impl<P: BoostingPolicy> BoostedEnsemble<P> {
    /// Ensemble driven by `policy`.
    pub fn new(policy: P, config: BoostingConfig) -> Result<Self> {
        config.validate()?;
        Ok(BoostedEnsemble {
            policy,
            config,
            members: Vec::new(),
            effective_length: 0,
            history: Vec::new(),
            num_classes: None,
        })
    }

    /// The boosting policy
    pub fn policy(&self) -> &P {
        &self.policy
    }

    /// The ensemble configuration
    pub fn config(&self) -> &BoostingConfig {
        &self.config
    }

    /// All trained members, including those past the effective length
    pub fn members(&self) -> &[EnsembleMember] {
        &self.members
    }

    /// Member weights in round order
    pub fn weights(&self) -> Vec<f64> {
        self.members.iter().map(|m| m.weight).collect()
    }

    /// Number of leading members used for prediction
    pub fn effective_length(&self) -> usize {
        self.effective_length
    }

    /// Per-round summaries of the last training run
    pub fn history(&self) -> &[RoundSummary] {
        &self.history
    }

    /// Whether the ensemble has been trained
    pub fn is_trained(&self) -> bool {
        self.num_classes.is_some()
    }

    fn fit(&mut self, dataset: &Dataset) -> Result<()> {
        if dataset.is_empty() {
            return Err(DatasetError::Empty.into());
        }
        let mut rng = StdRng::seed_from_u64(self.config.random_seed);
        let total = self.policy.calculate_member_count(dataset, &mut rng)?;
        if total == 0 {
            return Err(RebalanceError::invalid_parameter(
                "num_members",
                "0",
                "boosting needs at least one member",
            ));
        }

        let priors = dataset.priors();
        let n = dataset.num_instances();
        let mut distribution = vec![1.0 / n as f64; n];

        self.members.clear();
        self.history.clear();
        self.effective_length = 1;
        self.num_classes = None;
        let mut best_performance = 0.0;

        log::info!(
            "Boosting up to {} members ({}) on {} rows, priors {:?}",
            total,
            self.policy.name(),
            n,
            priors.as_slice()
        );

        for t in 0..total {
            let round_set =
                self.policy
                    .generate_round_dataset(dataset, &distribution, t, total, &mut rng)?;
            let round_set = prior_scaled(&round_set, &priors)?;

            let mut classifier = self.policy.produce_member(t, total)?;
            classifier
                .train(&round_set)
                .map_err(|e| TrainingError::MemberFailed {
                    round: t,
                    reason: e.to_string(),
                })?;
            let evaluation = evaluate_member(classifier.as_ref(), dataset)?;
            self.members.push(EnsembleMember {
                classifier,
                weight: if t == 0 { 1.0 } else { 0.0 },
            });

            let performance = evaluation.counts.geometric_mean_tpr();
            if performance == 0.0 {
                log::debug!("Round {}: performance 0, stopping", t);
                self.record(t, performance, None, false);
                break;
            }

            let retained =
                !self.policy.keep_only_favorable_rounds() || performance > best_performance;
            if retained {
                self.effective_length = t + 1;
                best_performance = performance;
            }

            let mut loss = 0.0;
            let mut max_loss = 0.0;
            for (i, (&d, &label)) in distribution.iter().zip(dataset.labels()).enumerate() {
                loss += d * evaluation.errors[i] * priors[label];
                max_loss += 2.0 * d * priors[label];
            }
            let pseudo_loss = if max_loss == 0.0 { 0.0 } else { loss / max_loss };

            if pseudo_loss == 0.0 {
                for member in self.members.iter_mut() {
                    member.weight = 0.0;
                }
                self.members[t].weight = 1.0;
                self.effective_length = t + 1;
                log::debug!("Round {}: member classifies every row correctly, stopping", t);
                self.record(t, performance, Some(pseudo_loss), true);
                break;
            }
            if pseudo_loss >= 1.0 {
                log::warn!("Round {}: pseudo-loss {:.4} leaves no usable update, stopping", t, pseudo_loss);
                self.record(t, performance, Some(pseudo_loss), retained);
                break;
            }

            let beta = pseudo_loss / (1.0 - pseudo_loss);
            self.members[t].weight = -beta.ln() * performance;
            for (d, &error) in distribution.iter_mut().zip(&evaluation.errors) {
                *d *= beta.powf(1.0 - error / 2.0);
            }
            normalize(&mut distribution);

            log::debug!(
                "Round {}: performance {:.4}, pseudo-loss {:.4}, weight {:.4}{}",
                t,
                performance,
                pseudo_loss,
                self.members[t].weight,
                if retained { "" } else { " (not retained)" }
            );
            self.record(t, performance, Some(pseudo_loss), retained);
        }

        self.num_classes = Some(dataset.num_classes());
        log::info!(
            "Boosting finished: {} members trained, {} used, weights {:?}",
            self.members.len(),
            self.effective_length,
            self.weights()
        );
        Ok(())
    }

    fn record(&mut self, round: usize, performance: f64, pseudo_loss: Option<f64>, retained: bool) {
        self.history.push(RoundSummary {
            round,
            performance,
            pseudo_loss,
            member_weight: self.members[round].weight,
            retained,
            effective_length: self.effective_length,
        });
    }
}

/// Rescale round weights to `w / sum(w) * 2 / prior[label]`; rows of a class
/// with prior 0 get weight 0. An all-zero round falls back to uniform.
fn prior_scaled(round_set: &Dataset, priors: &ClassPriors) -> Result<Dataset> {
    let sum = round_set.total_weight();
    let n = round_set.num_instances() as f64;
    let weights: Array1<f64> = round_set
        .iter()
        .map(|instance| {
            let share = if sum > 0.0 { instance.weight / sum } else { 1.0 / n };
            let prior = priors.get(instance.label);
            if prior > 0.0 {
                share * 2.0 / prior
            } else {
                0.0
            }
        })
        .collect();
    round_set.reweighted(weights)
}

/// Correctness counts and pseudo-errors of one member over every row.
///
/// The pseudo-error of a misclassified row is `1 - P(true) + P(predicted)`,
/// with `P(predicted) = 0` when the member has no preference.
fn evaluate_member(member: &dyn Classifier, dataset: &Dataset) -> Result<RoundEvaluation> {
    let mut counts = ClassCounts::new(dataset.num_classes());
    let mut errors = Vec::with_capacity(dataset.num_instances());
    for instance in dataset.iter() {
        let distribution = member.predict_distribution(&instance.features)?;
        if distribution.len() != dataset.num_classes() {
            return Err(RebalanceError::dimension_mismatch(
                format!("{} classes", dataset.num_classes()),
                format!("{} classes", distribution.len()),
            ));
        }
        let predicted = argmax(&distribution);
        counts.record(instance.label, predicted);
        let error = match predicted {
            Some(p) if p == instance.label => 0.0,
            Some(p) => 1.0 - distribution[instance.label] + distribution[p],
            None => 1.0 - distribution[instance.label],
        };
        errors.push(error);
    }
    Ok(RoundEvaluation { counts, errors })
}

impl<P: BoostingPolicy + Clone + 'static> Classifier for BoostedEnsemble<P> {
    fn train(&mut self, dataset: &Dataset) -> Result<()> {
        self.fit(dataset)
    }

    fn predict_distribution(&self, features: &ArrayView1<'_, f64>) -> Result<Vec<f64>> {
        let num_classes = self
            .num_classes
            .ok_or_else(|| RebalanceError::not_trained("BoostedEnsemble"))?;
        let mut combined = vec![0.0; num_classes];
        for member in &self.members[..self.effective_length] {
            let distribution = member.classifier.predict_distribution(features)?;
            if distribution.len() != num_classes {
                return Err(RebalanceError::dimension_mismatch(
                    format!("{} classes", num_classes),
                    format!("{} classes", distribution.len()),
                ));
            }
            for (total, value) in combined.iter_mut().zip(distribution) {
                *total += member.weight * value;
            }
        }
        normalize(&mut combined);
        Ok(combined)
    }

    fn name(&self) -> &'static str {
        "BoostedEnsemble"
    }

    fn clone_box(&self) -> Box<dyn Classifier> {
        Box::new(self.clone())
    }
}
