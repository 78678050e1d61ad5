//! Fundamental enumerations shared by the rebalancing and boosting layers.
//!
//! All enums parse from the short option names used in option strings
//! (`"exp"`, `"lin"`, `"entr"`, ...) as well as their full names, and display
//! as their canonical lowercase name.

use crate::core::error::{RebalanceError, Result};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Class index in `[0, K)`.
pub type ClassIndex = usize;

/// Family of per-class rebalance functions `F(f, w, sign)`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FunctionForm {
    /// Identity, `F = w`
    None,
    /// `w * ((1 + sign) / 2 - sign * f)`
    Linear,
    /// `w ^ ((1 - sign) / 2 + sign * f)`
    Exponential,
    /// `w * f ^ (-sign)`, with `f = 0` treated as 1
    Inverse,
    /// `ln(1 + w) * ((1 + sign) / 2 - sign * f)`
    Log,
    /// `(1 + sign) - sign * f`, independent of `w`
    Threshold,
}

impl Default for FunctionForm {
    fn default() -> Self {
        FunctionForm::Exponential
    }
}

impl fmt::Display for FunctionForm {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FunctionForm::None => write!(f, "none"),
            FunctionForm::Linear => write!(f, "linear"),
            FunctionForm::Exponential => write!(f, "exponential"),
            FunctionForm::Inverse => write!(f, "inverse"),
            FunctionForm::Log => write!(f, "log"),
            FunctionForm::Threshold => write!(f, "threshold"),
        }
    }
}

impl FromStr for FunctionForm {
    type Err = RebalanceError;

    fn from_str(s: &str) -> Result<Self> {
        let s = s.to_lowercase();
        if s.starts_with("exp") {
            Ok(FunctionForm::Exponential)
        } else if s.starts_with("inv") {
            Ok(FunctionForm::Inverse)
        } else if s.starts_with("lin") {
            Ok(FunctionForm::Linear)
        } else if s.starts_with("log") {
            Ok(FunctionForm::Log)
        } else if s.starts_with("thr") {
            Ok(FunctionForm::Threshold)
        } else if s.starts_with("non") {
            Ok(FunctionForm::None)
        } else {
            Err(RebalanceError::invalid_parameter(
                "function",
                s,
                "expected one of none, linear, exponential, inverse, log, threshold",
            ))
        }
    }
}

/// Per-prediction scaling policy for the rebalance strength.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DynamicForm {
    /// Constant strength
    None,
    /// Strength scaled by the normalized entropy of the base distribution
    Entropy,
    /// Entropy scaling, applied as a margin from the full-confidence value
    Margin,
    /// Strength divided by the function slope at the majority prior
    Max,
    /// Strength scaled by the label impurity of the nearest training rows
    Cleanliness,
}

impl Default for DynamicForm {
    fn default() -> Self {
        DynamicForm::Entropy
    }
}

impl fmt::Display for DynamicForm {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DynamicForm::None => write!(f, "none"),
            DynamicForm::Entropy => write!(f, "entropy"),
            DynamicForm::Margin => write!(f, "margin"),
            DynamicForm::Max => write!(f, "max"),
            DynamicForm::Cleanliness => write!(f, "cleanliness"),
        }
    }
}

impl FromStr for DynamicForm {
    type Err = RebalanceError;

    fn from_str(s: &str) -> Result<Self> {
        let s = s.to_lowercase();
        if s.starts_with("entr") {
            Ok(DynamicForm::Entropy)
        } else if s.starts_with("non") {
            Ok(DynamicForm::None)
        } else if s.starts_with("margin") {
            Ok(DynamicForm::Margin)
        } else if s.starts_with("max") {
            Ok(DynamicForm::Max)
        } else if s.starts_with("clean") {
            Ok(DynamicForm::Cleanliness)
        } else {
            Err(RebalanceError::invalid_parameter(
                "dynamic",
                s,
                "expected one of none, entropy, margin, max, cleanliness",
            ))
        }
    }
}

/// Training-set preprocessing applied before the base classifier is trained.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PreprocessForm {
    /// Train on the dataset as given
    None,
    /// Class-balance-biased resample with replacement
    Resample,
    /// Synthetic minority oversampling
    Smote,
}

impl Default for PreprocessForm {
    fn default() -> Self {
        PreprocessForm::None
    }
}

impl fmt::Display for PreprocessForm {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PreprocessForm::None => write!(f, "none"),
            PreprocessForm::Resample => write!(f, "resample"),
            PreprocessForm::Smote => write!(f, "smote"),
        }
    }
}

impl FromStr for PreprocessForm {
    type Err = RebalanceError;

    fn from_str(s: &str) -> Result<Self> {
        let s = s.to_lowercase();
        if s.ends_with("sample") {
            Ok(PreprocessForm::Resample)
        } else if s.starts_with("smote") {
            Ok(PreprocessForm::Smote)
        } else if s.starts_with("non") {
            Ok(PreprocessForm::None)
        } else {
            Err(RebalanceError::invalid_parameter(
                "preprocess",
                s,
                "expected one of none, resample, smote",
            ))
        }
    }
}

/// Signed rebalance strength, either fixed or chosen by the tuning search.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RebalanceParameter {
    /// A fixed signed strength. Zero disables rebalancing.
    Fixed(f64),
    /// Select the strength by local search at training time.
    Tune,
}

impl RebalanceParameter {
    /// The fixed value, if any.
    pub fn fixed(&self) -> Option<f64> {
        match self {
            RebalanceParameter::Fixed(value) => Some(*value),
            RebalanceParameter::Tune => None,
        }
    }

    /// Whether training must run the tuning search.
    pub fn is_tune(&self) -> bool {
        matches!(self, RebalanceParameter::Tune)
    }
}

impl Default for RebalanceParameter {
    fn default() -> Self {
        RebalanceParameter::Fixed(crate::core::constants::DEFAULT_REBALANCE_PARAMETER)
    }
}

impl fmt::Display for RebalanceParameter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RebalanceParameter::Fixed(value) => write!(f, "{}", value),
            RebalanceParameter::Tune => write!(f, "tune"),
        }
    }
}

impl FromStr for RebalanceParameter {
    type Err = RebalanceError;

    fn from_str(s: &str) -> Result<Self> {
        let s = s.trim().to_lowercase();
        if s.starts_with("tune") {
            return Ok(RebalanceParameter::Tune);
        }
        let value: f64 = s.parse().map_err(|_| {
            RebalanceError::invalid_parameter("rebalance", s.as_str(), "expected a number or 'tune'")
        })?;
        if !value.is_finite() {
            return Err(RebalanceError::invalid_parameter(
                "rebalance",
                s.as_str(),
                "must be finite",
            ));
        }
        Ok(RebalanceParameter::Fixed(value))
    }
}
