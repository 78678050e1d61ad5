//! Bounded local search for the rebalance parameter.
//!
//! The search evaluates `grid_size` equally spaced candidates over
//! `[center - radius, center + radius]` (clamped to the configured bounds),
//! re-centers on the best candidate seen so far and narrows the radius to
//! the grid spacing just used, for `depth` levels. Candidates are scored
//! with [`ClassCounts::tuning_score`] either on the training set itself or
//! by cross-validating a pretrained copy of the wrapper.
//!
//! A candidate replaces the incumbent only with a strictly greater score,
//! or an equal score at a smaller `|value|`; otherwise the first seen wins.
//! Parallel evaluation collects scores in candidate order before this
//! reduction, so the outcome does not depend on thread scheduling.

use crate::config::TuningConfig;
use crate::core::error::{RebalanceError, Result, TrainingError};
use crate::core::math::argmax;
use crate::dataset::Dataset;
use crate::hyperopt::{cross_validate, CrossValidationConfig};
use crate::metrics_eval::ClassCounts;
use crate::rebalance::RebalancingWrapper;
use rayon::prelude::*;
use rayon::ThreadPool;
use serde::{Deserialize, Serialize};

/// Result of a parameter search.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct TuningOutcome {
    /// Selected signed parameter
    pub parameter: f64,
    /// Its score
    pub score: f64,
    /// Number of candidate evaluations performed
    pub evaluations: usize,
}

/// Search for the parameter of `wrapper` that maximizes the tuning score on
/// `dataset`.
///
/// The wrapper must already hold its trained state. It is not modified.
pub fn tune_parameter(
    wrapper: &RebalancingWrapper,
    dataset: &Dataset,
    config: &TuningConfig,
) -> Result<TuningOutcome> {
    config.validate()?;
    let pool = match (config.parallel, config.num_threads) {
        (true, threads) if threads > 0 => Some(
            rayon::ThreadPoolBuilder::new()
                .num_threads(threads)
                .build()
                .map_err(|e| RebalanceError::internal(format!("Failed to create thread pool: {}", e)))?,
        ),
        _ => None,
    };

    let folds = if config.folds > 1 && dataset.num_instances() < config.folds {
        log::warn!(
            "Only {} rows for {}-fold tuning, scoring on the training set instead",
            dataset.num_instances(),
            config.folds
        );
        1
    } else {
        config.folds
    };

    local_search(config, pool.as_ref(), |candidate| {
        score_candidate(wrapper, dataset, config, folds, candidate)
    })
}

/// Run the level-by-level search with an arbitrary scoring function.
fn local_search<F>(config: &TuningConfig, pool: Option<&ThreadPool>, score: F) -> Result<TuningOutcome>
where
    F: Fn(f64) -> Result<f64> + Sync,
{
    let mut center = config.center();
    let mut radius = config.radius();
    let mut best: Option<(f64, f64)> = None;
    let mut evaluations = 0;

    for level in 0..config.depth {
        let candidates = grid(center, radius, config);
        let scores: Vec<f64> = if !config.parallel {
            candidates.iter().map(|&c| score(c)).collect::<Result<_>>()?
        } else if let Some(pool) = pool {
            pool.install(|| candidates.par_iter().map(|&c| score(c)).collect::<Result<_>>())?
        } else {
            candidates.par_iter().map(|&c| score(c)).collect::<Result<_>>()?
        };
        evaluations += candidates.len();

        for (&candidate, &candidate_score) in candidates.iter().zip(&scores) {
            log::trace!("Candidate {:.5}: score {:.5}", candidate, candidate_score);
            let replaces = match best {
                None => true,
                Some((value, score)) => {
                    candidate_score > score
                        || (candidate_score == score && candidate.abs() < value.abs())
                }
            };
            if replaces {
                best = Some((candidate, candidate_score));
            }
        }

        if let Some((value, score)) = best {
            log::debug!(
                "Tuning level {}/{}: radius {:.4}, best {:.5} (score {:.5})",
                level + 1,
                config.depth,
                radius,
                value,
                score
            );
            center = value;
        }
        radius = grid_step(radius, config);
    }

    let (parameter, score) =
        best.ok_or_else(|| TrainingError::TuningFailed {
            reason: "no candidates were evaluated".to_string(),
        })?;
    Ok(TuningOutcome {
        parameter,
        score,
        evaluations,
    })
}

/// Spacing between neighboring candidates of a level with half-width
/// `radius`. Zero for a single-point grid.
pub fn grid_step(radius: f64, config: &TuningConfig) -> f64 {
    if config.grid_size <= 1 {
        0.0
    } else {
        2.0 * radius / (config.grid_size - 1) as f64
    }
}

/// Candidates of one level, in ascending order before clamping.
pub fn grid(center: f64, radius: f64, config: &TuningConfig) -> Vec<f64> {
    let clamp = |value: f64| value.clamp(config.min_parameter, config.max_parameter);
    if config.grid_size == 1 {
        return vec![clamp(center)];
    }
    let step = grid_step(radius, config);
    (0..config.grid_size)
        .map(|i| clamp(center - radius + step * i as f64))
        .collect()
}

fn score_candidate(
    wrapper: &RebalancingWrapper,
    dataset: &Dataset,
    config: &TuningConfig,
    folds: usize,
    candidate: f64,
) -> Result<f64> {
    let counts = if folds > 1 {
        let copy = wrapper.pretrained_copy(candidate);
        let cv = CrossValidationConfig::new()
            .with_num_folds(folds)
            .with_random_seed(config.random_seed);
        cross_validate(&copy, dataset, &cv)?.aggregate
    } else {
        let mut counts = ClassCounts::new(dataset.num_classes());
        for instance in dataset.iter() {
            let distribution = wrapper.predict_with_parameter(&instance.features, candidate)?;
            counts.record(instance.label, argmax(&distribution));
        }
        counts
    };
    Ok(counts.tuning_score(config.fairness_weight))
}
