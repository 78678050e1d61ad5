//! Error handling and error types for the imbalance-aware modeling layer.
//!
//! Every fallible operation in the crate returns [`Result`], carrying a
//! [`RebalanceError`]. Component-specific enums such as [`DatasetError`]
//! convert into it so that `?` works across module boundaries.

use std::io;
use thiserror::Error;

/// Main error type for the crate.
///
/// Configuration problems are reported when a configuration is built or
/// parsed, data-contract violations when a dataset is constructed, and
/// training or prediction failures when the corresponding operation runs.
#[derive(Error, Debug)]
pub enum RebalanceError {
    /// Configuration and validation errors
    #[error("Configuration error: {message}")]
    Config {
        /// What was wrong with the configuration
        message: String,
    },

    /// Dataset-related errors
    #[error("Dataset error: {message}")]
    Dataset {
        /// Description of the data-contract violation
        message: String,
    },

    /// Training-related errors
    #[error("Training error: {message}")]
    Training {
        /// Description of the training failure
        message: String,
    },

    /// Component used before it was trained
    #[error("{component} has not been trained")]
    NotTrained {
        /// Name of the untrained component
        component: String,
    },

    /// File I/O errors
    #[error("I/O error: {source}")]
    IO {
        /// Underlying I/O error
        #[from]
        source: io::Error,
    },

    /// JSON serialization errors
    #[error("JSON error: {source}")]
    Json {
        /// Underlying serde_json error
        #[from]
        source: serde_json::Error,
    },

    /// TOML parsing errors
    #[error("TOML parse error: {source}")]
    TomlParse {
        /// Underlying TOML deserialization error
        #[from]
        source: toml::de::Error,
    },

    /// TOML serialization errors
    #[error("TOML serialization error: {source}")]
    TomlSerialize {
        /// Underlying TOML serialization error
        #[from]
        source: toml::ser::Error,
    },

    /// Invalid input parameters
    #[error("Invalid parameter: {parameter} = {value}, {reason}")]
    InvalidParameter {
        /// Parameter name
        parameter: String,
        /// Rejected value, as text
        value: String,
        /// Why it was rejected
        reason: String,
    },

    /// Dimension mismatch errors
    #[error("Dimension mismatch: expected {expected}, got {actual}")]
    DimensionMismatch {
        /// Expected shape
        expected: String,
        /// Shape actually seen
        actual: String,
    },

    /// Out of bounds access
    #[error("Index out of bounds: index {index}, length {length}")]
    IndexOutOfBounds {
        /// Offending index
        index: usize,
        /// Length of the indexed collection
        length: usize,
    },

    /// Internal library errors (should not occur in normal usage)
    #[error("Internal error: {message}")]
    Internal {
        /// Description of the failure
        message: String,
    },
}

/// Data-contract violations detected while building or slicing a dataset.
#[derive(Error, Debug)]
pub enum DatasetError {
    /// The dataset has no rows
    #[error("Empty dataset provided")]
    Empty,

    /// A label is not a valid class index
    #[error("Label {label} of instance {index} is outside [0, {num_classes})")]
    LabelOutOfRange {
        /// Row of the offending label
        index: usize,
        /// The label itself
        label: usize,
        /// Number of classes of the dataset
        num_classes: usize,
    },

    /// Features, labels and weights disagree on the number of rows
    #[error("Row count mismatch: {features} feature rows, {labels} labels, {weights} weights")]
    RowCountMismatch {
        /// Rows in the feature matrix
        features: usize,
        /// Number of labels
        labels: usize,
        /// Number of weights
        weights: usize,
    },

    /// Rows disagree on the number of features
    #[error("Feature count mismatch: expected {expected}, got {actual}")]
    FeatureMismatch {
        /// Feature count of the dataset
        expected: usize,
        /// Feature count of the offending row
        actual: usize,
    },

    /// A weight is negative or not finite
    #[error("Instance {index} has invalid weight {value}")]
    InvalidWeight {
        /// Row of the offending weight
        index: usize,
        /// The weight itself
        value: f64,
    },

    /// The class count is zero
    #[error("At least one class is required, got {num_classes}")]
    NoClasses {
        /// Requested class count
        num_classes: usize,
    },

    /// A class the operation needs has no rows
    #[error("Class {class} has no instances")]
    MissingClass {
        /// The absent class
        class: usize,
    },
}

/// Training-specific errors
#[derive(Error, Debug)]
pub enum TrainingError {
    /// Too few rows for the requested procedure
    #[error("Insufficient data: need at least {required} samples, got {actual}")]
    InsufficientData {
        /// Minimum number of rows
        required: usize,
        /// Rows available
        actual: usize,
    },

    /// An ensemble member failed to train
    #[error("Ensemble member {round} failed: {reason}")]
    MemberFailed {
        /// Boosting round of the member
        round: usize,
        /// Error reported by the member
        reason: String,
    },

    /// The parameter search produced no result
    #[error("Parameter search failed: {reason}")]
    TuningFailed {
        /// Why the search failed
        reason: String,
    },
}

/// Type alias for Results using RebalanceError
pub type Result<T> = std::result::Result<T, RebalanceError>;

impl RebalanceError {
    /// Create a configuration error
    pub fn config<S: Into<String>>(message: S) -> Self {
        RebalanceError::Config {
            message: message.into(),
        }
    }

    /// Create a dataset error
    pub fn dataset<S: Into<String>>(message: S) -> Self {
        RebalanceError::Dataset {
            message: message.into(),
        }
    }

    /// Create an error for a component queried before training
    pub fn not_trained<S: Into<String>>(component: S) -> Self {
        RebalanceError::NotTrained {
            component: component.into(),
        }
    }

    /// Create an invalid parameter error
    pub fn invalid_parameter<P, V, R>(parameter: P, value: V, reason: R) -> Self
    where
        P: Into<String>,
        V: Into<String>,
        R: Into<String>,
    {
        RebalanceError::InvalidParameter {
            parameter: parameter.into(),
            value: value.into(),
            reason: reason.into(),
        }
    }

    /// Create a dimension mismatch error
    pub fn dimension_mismatch<E, A>(expected: E, actual: A) -> Self
    where
        E: Into<String>,
        A: Into<String>,
    {
        RebalanceError::DimensionMismatch {
            expected: expected.into(),
            actual: actual.into(),
        }
    }

    /// Create an index out of bounds error
    pub fn index_out_of_bounds(index: usize, length: usize) -> Self {
        RebalanceError::IndexOutOfBounds { index, length }
    }

    /// Create an internal error (should be used sparingly)
    pub fn internal<S: Into<String>>(message: S) -> Self {
        RebalanceError::Internal {
            message: message.into(),
        }
    }

    /// Check if this error is recoverable
    pub fn is_recoverable(&self) -> bool {
        match self {
            RebalanceError::Config { .. } => false,
            RebalanceError::Dataset { .. } => false,
            RebalanceError::Training { .. } => true,
            RebalanceError::NotTrained { .. } => false,
            RebalanceError::IO { .. } => false,
            RebalanceError::Json { .. } => false,
            RebalanceError::TomlParse { .. } => false,
            RebalanceError::TomlSerialize { .. } => false,
            RebalanceError::InvalidParameter { .. } => false,
            RebalanceError::DimensionMismatch { .. } => false,
            RebalanceError::IndexOutOfBounds { .. } => false,
            RebalanceError::Internal { .. } => false,
        }
    }

    /// Get error category for logging
    pub fn category(&self) -> &'static str {
        match self {
            RebalanceError::Config { .. } => "config",
            RebalanceError::Dataset { .. } => "dataset",
            RebalanceError::Training { .. } => "training",
            RebalanceError::NotTrained { .. } => "not_trained",
            RebalanceError::IO { .. } => "io",
            RebalanceError::Json { .. } => "json",
            RebalanceError::TomlParse { .. } => "toml",
            RebalanceError::TomlSerialize { .. } => "toml",
            RebalanceError::InvalidParameter { .. } => "invalid_parameter",
            RebalanceError::DimensionMismatch { .. } => "dimension_mismatch",
            RebalanceError::IndexOutOfBounds { .. } => "index_out_of_bounds",
            RebalanceError::Internal { .. } => "internal",
        }
    }
}

impl From<DatasetError> for RebalanceError {
    fn from(err: DatasetError) -> Self {
        RebalanceError::Dataset {
            message: err.to_string(),
        }
    }
}

impl From<TrainingError> for RebalanceError {
    fn from(err: TrainingError) -> Self {
        RebalanceError::Training {
            message: err.to_string(),
        }
    }
}

/// Build a [`RebalanceError::Config`] from a message or format arguments.
#[macro_export]
macro_rules! config_error {
    ($msg:expr) => {
        $crate::core::error::RebalanceError::config($msg)
    };
    ($fmt:expr, $($arg:tt)*) => {
        $crate::core::error::RebalanceError::config(format!($fmt, $($arg)*))
    };
}

/// Build a [`RebalanceError::Dataset`] from a message or format arguments.
#[macro_export]
macro_rules! dataset_error {
    ($msg:expr) => {
        $crate::core::error::RebalanceError::dataset($msg)
    };
    ($fmt:expr, $($arg:tt)*) => {
        $crate::core::error::RebalanceError::dataset(format!($fmt, $($arg)*))
    };
}

/// Return early with `Err($err.into())` unless `$cond` holds.
#[macro_export]
macro_rules! ensure {
    ($cond:expr, $err:expr) => {
        if !($cond) {
            return Err($err.into());
        }
    };
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_creation() {
        let err = RebalanceError::config("test configuration error");
        assert_eq!(err.category(), "config");
        assert!(!err.is_recoverable());

        let err: RebalanceError = TrainingError::TuningFailed {
            reason: "test training error".to_string(),
        }
        .into();
        assert_eq!(err.category(), "training");
        assert!(err.is_recoverable());
    }

    #[test]
    fn test_error_macros() {
        let err = config_error!("test error");
        assert!(matches!(err, RebalanceError::Config { .. }));

        let err = dataset_error!("bad label {}", 7);
        assert!(matches!(err, RebalanceError::Dataset { .. }));
        assert!(err.to_string().contains("bad label 7"));
    }

    #[test]
    fn test_ensure_macro() {
        fn check(value: usize) -> Result<usize> {
            ensure!(value > 0, RebalanceError::config("value must be positive"));
            Ok(value)
        }
        assert!(check(0).is_err());
        assert_eq!(check(3).unwrap(), 3);
    }

    #[test]
    fn test_specialized_errors() {
        let err: RebalanceError = DatasetError::LabelOutOfRange {
            index: 4,
            label: 3,
            num_classes: 2,
        }
        .into();
        assert!(matches!(err, RebalanceError::Dataset { .. }));
        assert!(err.to_string().contains("outside [0, 2)"));

        let err: RebalanceError = TrainingError::MemberFailed {
            round: 2,
            reason: "diverged".to_string(),
        }
        .into();
        assert!(matches!(err, RebalanceError::Training { .. }));
    }

    #[test]
    fn test_missing_class_display() {
        let err: RebalanceError = DatasetError::MissingClass { class: 1 }.into();
        assert!(err.to_string().contains("Class 1 has no instances"));
        assert_eq!(err.category(), "dataset");
    }

    #[test]
    fn test_parameter_errors() {
        let err = RebalanceError::invalid_parameter("sensitivity", "-0.5", "must be non-negative");
        assert_eq!(err.category(), "invalid_parameter");
        assert!(err.to_string().contains("sensitivity = -0.5"));
    }

    #[test]
    fn test_not_trained_display() {
        let err = RebalanceError::not_trained("RebalancingWrapper");
        assert_eq!(err.to_string(), "RebalancingWrapper has not been trained");
        assert!(!err.is_recoverable());
    }

    #[test]
    fn test_io_error_conversion() {
        let io_err = io::Error::new(io::ErrorKind::NotFound, "file not found");
        let err: RebalanceError = io_err.into();
        assert!(matches!(err, RebalanceError::IO { .. }));
        assert_eq!(err.category(), "io");
    }
}
