//! Resampling collaborators used for preprocessing and boosting rounds.
//!
//! Each strategy implements [`Resampler`] and draws from a caller-supplied
//! seeded [`StdRng`], so the same seed always yields the same view.

use crate::core::constants::*;
use crate::core::error::{RebalanceError, Result};
use crate::core::math::squared_distance;
use crate::core::traits::Resampler;
use crate::dataset::{ClassPriors, Dataset};
use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use rand::Rng;

/// Resample with replacement, biased toward a uniform class distribution.
///
/// Each present class receives
/// `size * ((1 - bias) * prior + bias / present_classes)` rows drawn
/// uniformly from its members.
#[derive(Debug, Clone, PartialEq)]
pub struct ClassBiasedResample {
    /// 0 keeps the original class distribution, 1 makes it uniform
    pub bias_to_uniform: f64,
    /// Output size as a percentage of the input size
    pub sample_size_percent: f64,
}

impl ClassBiasedResample {
    /// Create a resampler with explicit bias and size.
    pub fn new(bias_to_uniform: f64, sample_size_percent: f64) -> Result<Self> {
        if !(0.0..=1.0).contains(&bias_to_uniform) {
            return Err(RebalanceError::invalid_parameter(
                "bias_to_uniform",
                bias_to_uniform.to_string(),
                "must be in range [0.0, 1.0]",
            ));
        }
        if !(sample_size_percent > 0.0) {
            return Err(RebalanceError::invalid_parameter(
                "sample_size_percent",
                sample_size_percent.to_string(),
                "must be positive",
            ));
        }
        Ok(Self {
            bias_to_uniform,
            sample_size_percent,
        })
    }

    /// Fully uniform resample sized by how imbalanced `priors` are:
    /// full-size beyond a 10× imbalance ratio, half-size otherwise.
    pub fn for_priors(priors: &ClassPriors) -> Self {
        let sample_size_percent = if priors.imbalance_ratio() > RESAMPLE_IMBALANCE_THRESHOLD {
            100.0
        } else {
            50.0
        };
        Self {
            bias_to_uniform: 1.0,
            sample_size_percent,
        }
    }
}

impl Resampler for ClassBiasedResample {
    fn resample(&self, dataset: &Dataset, rng: &mut StdRng) -> Result<Dataset> {
        let groups = dataset.indices_by_class();
        let present = groups.iter().filter(|g| !g.is_empty()).count();
        if present == 0 {
            return Ok(dataset.clone());
        }
        let total = dataset.num_instances() as f64 * self.sample_size_percent / 100.0;
        let n = dataset.num_instances() as f64;

        let mut indices = Vec::with_capacity(total.round() as usize);
        for members in groups.iter().filter(|g| !g.is_empty()) {
            let share = (1.0 - self.bias_to_uniform) * members.len() as f64 / n
                + self.bias_to_uniform / present as f64;
            let count = (total * share).round() as usize;
            for _ in 0..count {
                indices.push(members[rng.gen_range(0..members.len())]);
            }
        }
        log::trace!(
            "Resampled {} rows into {} (bias {})",
            dataset.num_instances(),
            indices.len(),
            self.bias_to_uniform
        );
        dataset.subset(&indices)
    }

    fn name(&self) -> &'static str {
        "class_biased_resample"
    }
}

/// Undersample larger classes so that no class exceeds `max_spread` times
/// the smallest present class.
///
/// Rows are drawn without replacement with probability proportional to
/// their weight, so the boosting distribution steers which rows survive.
/// Drawn rows keep their weights.
#[derive(Debug, Clone, PartialEq)]
pub struct SpreadSubsample {
    /// Maximum ratio between class sizes. Zero disables the limit.
    pub max_spread: f64,
}

impl SpreadSubsample {
    /// Create a spread subsampler.
    pub fn new(max_spread: f64) -> Result<Self> {
        if !(max_spread >= 0.0) || !max_spread.is_finite() {
            return Err(RebalanceError::invalid_parameter(
                "max_spread",
                max_spread.to_string(),
                "must be a finite non-negative number",
            ));
        }
        Ok(Self { max_spread })
    }

    fn weighted_without_replacement(
        members: &[usize],
        dataset: &Dataset,
        count: usize,
        rng: &mut StdRng,
    ) -> Vec<usize> {
        // Efraimidis-Spirakis keys u^(1/w); zero-weight rows sort last.
        let mut keyed: Vec<(f64, usize)> = members
            .iter()
            .map(|&i| {
                let w = dataset.weight(i);
                let u: f64 = rng.gen_range(f64::MIN_POSITIVE..1.0);
                let key = if w > 0.0 { u.powf(1.0 / w) } else { 0.0 };
                (key, i)
            })
            .collect();
        keyed.sort_by(|a, b| b.0.total_cmp(&a.0));
        let mut chosen: Vec<usize> = keyed.into_iter().take(count).map(|(_, i)| i).collect();
        chosen.sort_unstable();
        chosen
    }
}

impl Default for SpreadSubsample {
    fn default() -> Self {
        Self {
            max_spread: DEFAULT_MAX_SPREAD,
        }
    }
}

impl Resampler for SpreadSubsample {
    fn resample(&self, dataset: &Dataset, rng: &mut StdRng) -> Result<Dataset> {
        let groups = dataset.indices_by_class();
        let smallest = groups
            .iter()
            .map(Vec::len)
            .filter(|&len| len > 0)
            .min()
            .unwrap_or(0);
        if smallest == 0 || self.max_spread == 0.0 {
            return Ok(dataset.clone());
        }
        let limit = ((smallest as f64) * self.max_spread).round().max(1.0) as usize;

        let mut indices = Vec::new();
        for members in &groups {
            if members.len() <= limit {
                indices.extend_from_slice(members);
            } else {
                indices.extend(Self::weighted_without_replacement(members, dataset, limit, rng));
            }
        }
        log::trace!(
            "Spread subsample kept {} of {} rows (limit {} per class)",
            indices.len(),
            dataset.num_instances(),
            limit
        );
        dataset.subset(&indices)
    }

    fn name(&self) -> &'static str {
        "spread_subsample"
    }
}

/// Synthetic minority oversampling.
///
/// For each row of the target class, synthetic rows are interpolated toward
/// randomly chosen members of its `neighbors` nearest same-class rows
/// (Euclidean distance). `percentage = 100` doubles the class.
#[derive(Debug, Clone, PartialEq)]
pub struct Smote {
    /// Nearest neighbors considered per seed row
    pub neighbors: usize,
    /// Synthetic rows to add, as a percentage of the target class size
    pub percentage: f64,
    /// Class to oversample. Defaults to the least frequent present class.
    pub target_class: Option<usize>,
}

impl Smote {
    /// Create a SMOTE resampler.
    pub fn new(neighbors: usize, percentage: f64, target_class: Option<usize>) -> Result<Self> {
        if neighbors == 0 {
            return Err(RebalanceError::invalid_parameter(
                "neighbors",
                "0",
                "must be at least 1",
            ));
        }
        if !(percentage >= 0.0) {
            return Err(RebalanceError::invalid_parameter(
                "percentage",
                percentage.to_string(),
                "must be non-negative",
            ));
        }
        Ok(Self {
            neighbors,
            percentage,
            target_class,
        })
    }

    fn nearest(dataset: &Dataset, seed: usize, members: &[usize], k: usize) -> Vec<usize> {
        let origin = dataset.row(seed);
        let mut distances: Vec<(f64, usize)> = members
            .iter()
            .filter(|&&j| j != seed)
            .map(|&j| (squared_distance(&origin, &dataset.row(j)), j))
            .collect();
        distances.sort_by(|a, b| a.0.total_cmp(&b.0).then(a.1.cmp(&b.1)));
        distances.into_iter().take(k).map(|(_, j)| j).collect()
    }
}

impl Default for Smote {
    fn default() -> Self {
        Self {
            neighbors: SMOTE_NEIGHBORS,
            percentage: SMOTE_PERCENTAGE,
            target_class: None,
        }
    }
}

impl Resampler for Smote {
    fn resample(&self, dataset: &Dataset, rng: &mut StdRng) -> Result<Dataset> {
        let target = match self.target_class.or_else(|| dataset.priors().minority_class()) {
            Some(class) => class,
            None => return Ok(dataset.clone()),
        };
        if target >= dataset.num_classes() {
            return Err(RebalanceError::index_out_of_bounds(target, dataset.num_classes()));
        }
        let groups = dataset.indices_by_class();
        let members = &groups[target];
        if members.is_empty() {
            return Ok(dataset.clone());
        }

        let wanted = (members.len() as f64 * self.percentage / 100.0).round() as usize;
        let mut seeds: Vec<usize> = Vec::with_capacity(wanted);
        while seeds.len() + members.len() <= wanted {
            seeds.extend_from_slice(members);
        }
        let remainder = wanted - seeds.len();
        seeds.extend(members.choose_multiple(rng, remainder).copied());

        let mut rows = Vec::with_capacity(seeds.len());
        for &seed in &seeds {
            let origin = dataset.row(seed);
            let neighbors = Self::nearest(dataset, seed, members, self.neighbors);
            let row = match neighbors.choose(rng) {
                Some(&neighbor) => {
                    let other = dataset.row(neighbor);
                    let gap: f64 = rng.gen();
                    origin
                        .iter()
                        .zip(other.iter())
                        .map(|(&a, &b)| a + gap * (b - a))
                        .collect()
                }
                None => origin.to_vec(),
            };
            rows.push(row);
        }
        let labels = vec![target; rows.len()];
        let weights: Vec<f64> = seeds.iter().map(|&s| dataset.weight(s)).collect();
        log::trace!("SMOTE added {} synthetic rows to class {}", rows.len(), target);
        dataset.extended(&rows, &labels, &weights)
    }

    fn name(&self) -> &'static str {
        "smote"
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use ndarray::Array2;
    use rand::SeedableRng;

    fn imbalanced(majority: usize, minority: usize) -> Dataset {
        let n = majority + minority;
        let features = Array2::from_shape_fn((n, 2), |(i, j)| (i * 2 + j) as f64);
        let labels = (0..n).map(|i| usize::from(i >= majority)).collect();
        Dataset::new(features, labels, 2).unwrap()
    }

    #[test]
    fn test_biased_resample_uniform() {
        let dataset = imbalanced(90, 10);
        let sampler = ClassBiasedResample::new(1.0, 100.0).unwrap();
        let mut rng = StdRng::seed_from_u64(7);
        let resampled = sampler.resample(&dataset, &mut rng).unwrap();
        assert_eq!(resampled.num_instances(), 100);
        assert_eq!(resampled.class_counts(), vec![50, 50]);
    }

    #[test]
    fn test_biased_resample_size_choice() {
        let mild = ClassBiasedResample::for_priors(&ClassPriors::from_counts(&[80, 20]));
        assert_eq!(mild.sample_size_percent, 50.0);
        assert_eq!(mild.bias_to_uniform, 1.0);
        let severe = ClassBiasedResample::for_priors(&ClassPriors::from_counts(&[95, 5]));
        assert_eq!(severe.sample_size_percent, 100.0);
        assert_eq!(severe.bias_to_uniform, 1.0);
        assert!(ClassBiasedResample::new(1.5, 100.0).is_err());
    }

    #[test]
    fn test_mild_imbalance_resamples_half_size() {
        let dataset = imbalanced(80, 20);
        let sampler = ClassBiasedResample::for_priors(&dataset.priors());
        let resampled = sampler.resample(&dataset, &mut StdRng::seed_from_u64(4)).unwrap();
        assert_eq!(resampled.class_counts(), vec![25, 25]);
    }

    #[test]
    fn test_spread_subsample_limits_ratio() {
        let dataset = imbalanced(90, 10);
        let sampler = SpreadSubsample::new(5.0).unwrap();
        let mut rng = StdRng::seed_from_u64(3);
        let resampled = sampler.resample(&dataset, &mut rng).unwrap();
        assert_eq!(resampled.class_counts(), vec![50, 10]);
    }

    #[test]
    fn test_spread_subsample_prefers_heavy_rows() {
        let dataset = imbalanced(20, 2);
        let mut weights = vec![0.0; 22];
        for w in weights.iter_mut().take(4) {
            *w = 1.0;
        }
        weights[20] = 1.0;
        weights[21] = 1.0;
        let dataset = dataset.reweighted(weights.into()).unwrap();
        let sampler = SpreadSubsample::new(2.0).unwrap();
        let mut rng = StdRng::seed_from_u64(11);
        let resampled = sampler.resample(&dataset, &mut rng).unwrap();
        assert_eq!(resampled.class_counts(), vec![4, 2]);
        assert!(resampled.weights().iter().all(|&w| w == 1.0));
    }

    #[test]
    fn test_smote_doubles_minority() {
        let dataset = imbalanced(30, 6);
        let mut rng = StdRng::seed_from_u64(5);
        let resampled = Smote::default().resample(&dataset, &mut rng).unwrap();
        assert_eq!(resampled.class_counts(), vec![30, 12]);

        // Synthetic rows lie on segments between minority rows.
        let lo = dataset.row(30)[0];
        let hi = dataset.row(35)[0];
        for i in 36..42 {
            let x = resampled.row(i)[0];
            assert!(x >= lo && x <= hi);
        }
    }

    #[test]
    fn test_smote_single_minority_row_copies() {
        let dataset = imbalanced(5, 1);
        let mut rng = StdRng::seed_from_u64(5);
        let resampled = Smote::default().resample(&dataset, &mut rng).unwrap();
        assert_eq!(resampled.num_instances(), 7);
        assert_eq!(resampled.row(6).to_vec(), dataset.row(5).to_vec());
    }

    #[test]
    fn test_same_seed_same_sample() {
        let dataset = imbalanced(40, 8);
        let sampler = ClassBiasedResample::new(0.5, 100.0).unwrap();
        let a = sampler.resample(&dataset, &mut StdRng::seed_from_u64(9)).unwrap();
        let b = sampler.resample(&dataset, &mut StdRng::seed_from_u64(9)).unwrap();
        assert_eq!(a, b);
    }
}
