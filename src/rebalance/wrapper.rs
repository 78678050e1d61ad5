//! Post-hoc probability rebalancing around a base classifier.

use crate::config::RebalanceConfig;
use crate::core::constants::{CLEANLINESS_NEIGHBORS, LOGIT_SHIFT_NUMERATOR};
use crate::core::error::{DatasetError, RebalanceError, Result};
use crate::core::math::{l1_distance, normalize, normalized_entropy};
use crate::core::traits::{Classifier, Resampler};
use crate::core::types::{DynamicForm, PreprocessForm};
use crate::dataset::{ClassBiasedResample, ClassPriors, Dataset, Smote};
use crate::rebalance::tuning::tune_parameter;
use ndarray::ArrayView1;
use rand::rngs::StdRng;
use rand::SeedableRng;

/// What a wrapper learns from its training set.
#[derive(Debug, Clone)]
pub struct RebalanceState {
    /// Class priors of the training set
    pub priors: ClassPriors,
    /// Smallest prior
    pub min_prior: f64,
    /// Largest prior
    pub max_prior: f64,
    /// Rows the base classifier was trained on, kept when preprocessing or
    /// cleanliness scaling needs them
    pub training_set: Option<Dataset>,
}

/// Decorates a base classifier and reshapes its output distribution toward
/// (or away from) rare classes.
///
/// For a base distribution `d`, class priors `f` and signed parameter `p`,
/// each entry becomes `d_i * (1 - s) + s * F(f_i, d_i, sign(p))`, where `F`
/// is the configured [`FunctionForm`](crate::core::types::FunctionForm) and
/// the strength `s = |p|` is optionally scaled per prediction by the
/// configured [`DynamicForm`]. The result is clamped at zero and
/// renormalized.
///
/// # Examples
///
/// ```rust,no_run
/// use imbalance_boost::*;
///
/// # fn example(base: Box<dyn Classifier>, dataset: &Dataset) -> Result<()> {
/// let config = RebalanceConfig::from_options("-function exp -rebalance tune -dynamic entropy")?;
/// let mut wrapper = RebalancingWrapper::new(base, config)?;
/// wrapper.train(dataset)?;
/// let distribution = wrapper.predict_distribution(&dataset.row(0))?;
/// # Ok(())
/// # }
/// ```
#[derive(Debug, Clone)]
pub struct RebalancingWrapper {
    base: Box<dyn Classifier>,
    config: RebalanceConfig,
    parameter: f64,
    state: Option<RebalanceState>,
}

impl RebalancingWrapper {
    /// Wrap `base` with a validated configuration.
    pub fn new(base: Box<dyn Classifier>, config: RebalanceConfig) -> Result<Self> {
        config.validate()?;
        let parameter = config.rebalance_parameter.fixed().unwrap_or(0.0);
        Ok(RebalancingWrapper {
            base,
            config,
            parameter,
            state: None,
        })
    }

    /// Wrap `base` with the default configuration.
    pub fn with_defaults(base: Box<dyn Classifier>) -> Self {
        let config = RebalanceConfig::default();
        let parameter = config.rebalance_parameter.fixed().unwrap_or(0.0);
        RebalancingWrapper {
            base,
            config,
            parameter,
            state: None,
        }
    }

    /// The wrapper's configuration
    pub fn config(&self) -> &RebalanceConfig {
        &self.config
    }

    /// The wrapped classifier
    pub fn base(&self) -> &dyn Classifier {
        self.base.as_ref()
    }

    /// Current signed rebalance parameter, tuned or fixed
    pub fn rebalance_parameter(&self) -> f64 {
        self.parameter
    }

    /// Override the rebalance parameter without retraining.
    pub fn set_rebalance_parameter(&mut self, parameter: f64) -> Result<()> {
        if !parameter.is_finite() {
            return Err(RebalanceError::invalid_parameter(
                "rebalance_parameter",
                parameter.to_string(),
                "must be finite",
            ));
        }
        self.parameter = parameter;
        Ok(())
    }

    /// State from the last training run, if any
    pub fn state(&self) -> Option<&RebalanceState> {
        self.state.as_ref()
    }

    /// Whether the wrapper has been trained
    pub fn is_trained(&self) -> bool {
        self.state.is_some()
    }

    /// Copy of this wrapper around the already-trained base, fixed at
    /// `parameter`, for re-evaluation on other splits.
    pub fn pretrained_copy(&self, parameter: f64) -> Self {
        let mut config = self.config.clone();
        config.pretrained = true;
        config.rebalance_parameter = crate::core::types::RebalanceParameter::Fixed(parameter);
        RebalancingWrapper {
            base: self.base.clone(),
            config,
            parameter,
            state: None,
        }
    }

    /// Preprocess `dataset` and train the base classifier on the result,
    /// unless it is marked pretrained. Returns the rows the base saw.
    pub fn train_base(&mut self, dataset: &Dataset) -> Result<Dataset> {
        if self.config.pretrained {
            return Ok(dataset.clone());
        }

        let mut rng = StdRng::seed_from_u64(self.config.random_seed);
        let training_set = match self.config.preprocess {
            PreprocessForm::None => dataset.clone(),
            PreprocessForm::Resample => {
                ClassBiasedResample::for_priors(&dataset.priors()).resample(dataset, &mut rng)?
            }
            PreprocessForm::Smote => Smote::default().resample(dataset, &mut rng)?,
        };
        if self.config.preprocess != PreprocessForm::None {
            log::debug!(
                "Preprocessed {} rows into {} ({}), new priors {:?}",
                dataset.num_instances(),
                training_set.num_instances(),
                self.config.preprocess,
                training_set.priors().as_slice()
            );
        }

        log::debug!("Training base classifier {}", self.base.name());
        self.base.train(&training_set)?;
        Ok(training_set)
    }

    /// Record priors of `dataset`, keep `training_set` when needed and tune
    /// the parameter if configured to.
    pub fn configure_transform(&mut self, dataset: &Dataset, training_set: Dataset) -> Result<()> {
        let priors = dataset.priors();
        if self.config.verbose {
            log::debug!(
                "Priors {:?}, imbalance ratio {:.3}",
                priors.as_slice(),
                priors.imbalance_ratio()
            );
        }
        self.state = Some(RebalanceState {
            min_prior: priors.min(),
            max_prior: priors.max(),
            priors,
            training_set: if self.config.retains_training_set() {
                Some(training_set)
            } else {
                None
            },
        });

        if self.config.rebalance_parameter.is_tune() {
            let outcome = tune_parameter(self, dataset, &self.config.tuning)?;
            self.parameter = outcome.parameter;
            if self.config.verbose {
                log::debug!(
                    "Tuned rebalance parameter to {} (score {:.4})",
                    outcome.parameter,
                    outcome.score
                );
            }
        }
        Ok(())
    }

    /// Rebalanced distribution for one row at an explicit parameter.
    pub fn predict_with_parameter(
        &self,
        features: &ArrayView1<'_, f64>,
        parameter: f64,
    ) -> Result<Vec<f64>> {
        let state = self
            .state
            .as_ref()
            .ok_or_else(|| RebalanceError::not_trained("RebalancingWrapper"))?;
        let mut distribution = self.base.predict_distribution(features)?;
        if distribution.len() != state.priors.len() {
            return Err(RebalanceError::dimension_mismatch(
                format!("{} classes", state.priors.len()),
                format!("{} classes", distribution.len()),
            ));
        }
        if parameter == 0.0 {
            return Ok(distribution);
        }
        self.rebalance(state, features, &mut distribution, parameter);
        Ok(distribution)
    }

    fn rebalance(
        &self,
        state: &RebalanceState,
        features: &ArrayView1<'_, f64>,
        distribution: &mut [f64],
        parameter: f64,
    ) {
        let strength = parameter.abs();
        let sign = parameter.signum();
        let form = self.config.function_form;

        if self.config.sensitivity > 0.0
            && normalized_entropy(distribution) < self.config.sensitivity
        {
            logitize(distribution);
        }

        let mut scale = match self.config.dynamic_form {
            DynamicForm::Entropy | DynamicForm::Margin => normalized_entropy(distribution),
            DynamicForm::Cleanliness => 1.0 - self.cleanliness(state, features),
            DynamicForm::None | DynamicForm::Max => 1.0,
        };
        scale *= strength;
        if self.config.dynamic_form == DynamicForm::Max {
            let slope = form.slope_at_certainty(state.max_prior, sign);
            if slope != 0.0 {
                scale /= slope;
            }
        }

        let priors = state.priors.as_slice();
        for (value, &prior) in distribution.iter_mut().zip(priors) {
            let rebalanced = if self.config.dynamic_form == DynamicForm::Margin {
                form.blend(prior, *value, sign, scale) - form.blend(prior, 1.0, sign, scale) + 1.0
            } else {
                form.blend(prior, *value, sign, scale)
            };
            *value = rebalanced.max(0.0);
        }
        normalize(distribution);
    }

    /// Fraction of same-label pairs among the nearest retained training
    /// rows (L1 distance). One when fewer than two rows are available.
    ///
    /// Linear scan over the retained rows.
    fn cleanliness(&self, state: &RebalanceState, features: &ArrayView1<'_, f64>) -> f64 {
        let training_set = match &state.training_set {
            Some(set) => set,
            None => return 1.0,
        };
        let mut distances: Vec<(f64, usize)> = (0..training_set.num_instances())
            .map(|i| (l1_distance(features, &training_set.row(i)), i))
            .collect();
        distances.sort_by(|a, b| a.0.total_cmp(&b.0).then(a.1.cmp(&b.1)));

        let k = CLEANLINESS_NEIGHBORS.min(distances.len());
        if k < 2 {
            return 1.0;
        }
        let labels: Vec<usize> = distances[..k].iter().map(|&(_, i)| training_set.label(i)).collect();
        let mut same = 0usize;
        for i in 0..k {
            for j in (i + 1)..k {
                if labels[i] == labels[j] {
                    same += 1;
                }
            }
        }
        same as f64 / (k * (k - 1) / 2) as f64
    }
}

/// Sharpen a distribution through the logit of its non-zero entries,
/// shifted so the smallest becomes `10 / K`, then renormalize.
///
/// Left untouched when any entry is exactly one.
fn logitize(distribution: &mut [f64]) {
    if distribution.iter().any(|&d| d == 1.0) {
        return;
    }
    let epsilon = LOGIT_SHIFT_NUMERATOR / distribution.len() as f64;
    let nonzero: Vec<bool> = distribution.iter().map(|&d| d != 0.0).collect();
    let mut min = f64::INFINITY;
    for (value, &keep) in distribution.iter_mut().zip(&nonzero) {
        if keep {
            *value = (*value / (1.0 - *value)).ln();
            min = min.min(*value);
        }
    }
    for (value, &keep) in distribution.iter_mut().zip(&nonzero) {
        if keep {
            *value -= min - epsilon;
        }
    }
    normalize(distribution);
}

impl Classifier for RebalancingWrapper {
    fn train(&mut self, dataset: &Dataset) -> Result<()> {
        if dataset.is_empty() {
            return Err(DatasetError::Empty.into());
        }
        log::info!(
            "Training rebalancing wrapper ({}) around {} on {} rows",
            self.config,
            self.base.name(),
            dataset.num_instances()
        );
        let training_set = self.train_base(dataset)?;
        self.configure_transform(dataset, training_set)
    }

    fn predict_distribution(&self, features: &ArrayView1<'_, f64>) -> Result<Vec<f64>> {
        let distribution = self.predict_with_parameter(features, self.parameter)?;
        if self.config.verbose {
            log::trace!("Rebalanced to {:?}", distribution);
        }
        Ok(distribution)
    }

    fn name(&self) -> &'static str {
        "RebalancingWrapper"
    }

    fn clone_box(&self) -> Box<dyn Classifier> {
        Box::new(self.clone())
    }
}
