//! Constants and configuration defaults.

/// Crate version string.
pub const IMBALANCE_BOOST_VERSION: &str = env!("CARGO_PKG_VERSION");

/// Default signed rebalance strength used when none is configured.
pub const DEFAULT_REBALANCE_PARAMETER: f64 = 0.8;

/// Default entropy threshold below which distributions are logit-sharpened.
/// Zero disables the step.
pub const DEFAULT_SENSITIVITY: f64 = 0.0;

/// Sensitivity selected by experiment-scheme abbreviations unless disabled.
pub const SCHEME_SENSITIVITY: f64 = 0.1;

/// Numerator of the shift applied after logit sharpening, divided by the class count.
pub const LOGIT_SHIFT_NUMERATOR: f64 = 10.0;

/// Neighbors inspected by the cleanliness dynamic form.
pub const CLEANLINESS_NEIGHBORS: usize = 5;

/// Lower bound of the tuning interval.
pub const DEFAULT_TUNING_MIN: f64 = -2.0;

/// Upper bound of the tuning interval.
pub const DEFAULT_TUNING_MAX: f64 = 2.0;

/// Candidates evaluated per tuning level.
pub const DEFAULT_TUNING_GRID_SIZE: usize = 10;

/// Number of refinement levels in the tuning search.
pub const DEFAULT_TUNING_DEPTH: usize = 3;

/// Weight of the pairwise fairness term in the tuning score.
pub const DEFAULT_FAIRNESS_WEIGHT: f64 = 0.2;

/// Folds used to score a tuning candidate. One scores on the training set.
pub const DEFAULT_TUNING_FOLDS: usize = 1;

/// Imbalance ratio above which preprocessing resamples at full size instead of half size.
pub const RESAMPLE_IMBALANCE_THRESHOLD: f64 = 10.0;

/// Maximum majority-to-minority ratio kept by spread subsampling.
pub const DEFAULT_MAX_SPREAD: f64 = 5.0;

/// Neighbors used when interpolating synthetic minority instances.
pub const SMOTE_NEIGHBORS: usize = 5;

/// Default SMOTE oversampling percentage of the minority class.
pub const SMOTE_PERCENTAGE: f64 = 100.0;

/// Refinement passes for adaptive class weights.
pub const ADAPTIVE_WEIGHT_ITERATIONS: usize = 100;

/// Maximum Lloyd passes when clustering the majority class.
pub const KMEANS_MAX_ITERATIONS: usize = 100;

/// Default number of boosting rounds.
pub const DEFAULT_NUM_MEMBERS: usize = 10;

/// Default number of cross-validation folds.
pub const DEFAULT_NUM_FOLDS: usize = 5;

/// Default random seed for reproducibility.
pub const DEFAULT_RANDOM_SEED: u64 = 1;

/// Default number of threads for parallel processing.
/// 0 means use the rayon global pool.
pub const DEFAULT_NUM_THREADS: usize = 0;
