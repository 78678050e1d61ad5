//! Rebalancing wrapper configuration.
//!
//! Besides the builder, a [`RebalanceConfig`] can be parsed from a
//! whitespace-separated option string:
//!
//! | option | value | effect |
//! |---|---|---|
//! | `-fun[ction]` | `exp`, `lin`, `inv`, `log`, `thr`, `non` | function family |
//! | `-dyn[amic]` | `entr`, `margin`, `max`, `clean`, `non` | dynamic scaling |
//! | `-reb[alance]` | number or `tune` | rebalance parameter |
//! | `-pre[process]` | `*sample`, `smote`, `non` | training-set preprocessing |
//! | `-sensitive` | number | entropy threshold for logit sharpening |
//! | `-pos[itive]` / `-neg[ative]` | | force the parameter's sign |
//! | `-trained` | | base classifier is already trained |
//! | `-debug` | | verbose logging |
//!
//! Options not given keep a neutral value (no rebalancing), unlike
//! [`RebalanceConfig::default`].
//!
//! Compact experiment-scheme names such as `"teexp"` (tuned, entropy
//! scaled, exponential) expand to option strings through
//! [`scheme_to_options`].

use crate::config::TuningConfig;
use crate::core::constants::{DEFAULT_RANDOM_SEED, SCHEME_SENSITIVITY};
use crate::core::error::{RebalanceError, Result};
use crate::core::types::{DynamicForm, FunctionForm, PreprocessForm, RebalanceParameter};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::Path;
use std::str::FromStr;

/// Configuration of a [`RebalancingWrapper`](crate::rebalance::RebalancingWrapper).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RebalanceConfig {
    /// Rebalance function family
    pub function_form: FunctionForm,
    /// Per-prediction strength scaling
    pub dynamic_form: DynamicForm,
    /// Signed strength, or `Tune` to search for one at training time
    pub rebalance_parameter: RebalanceParameter,
    /// Preprocessing of the training set before the base is trained
    pub preprocess: PreprocessForm,
    /// Entropy threshold under which base outputs are logit-sharpened (0 disables)
    pub sensitivity: f64,
    /// Skip training the base classifier
    pub pretrained: bool,
    /// Log tuning and prediction details at `debug` level
    pub verbose: bool,
    /// Seed for preprocessing draws
    pub random_seed: u64,
    /// Parameter search settings, used when `rebalance_parameter` is `Tune`
    pub tuning: TuningConfig,
}

impl Default for RebalanceConfig {
    fn default() -> Self {
        RebalanceConfig {
            function_form: FunctionForm::default(),
            dynamic_form: DynamicForm::default(),
            rebalance_parameter: RebalanceParameter::default(),
            preprocess: PreprocessForm::default(),
            sensitivity: 0.0,
            pretrained: false,
            verbose: false,
            random_seed: DEFAULT_RANDOM_SEED,
            tuning: TuningConfig::default(),
        }
    }
}

impl RebalanceConfig {
    /// Default configuration: exponential form, parameter 0.8, entropy scaling
    pub fn new() -> Self {
        Self::default()
    }

    /// Configuration that leaves the base distribution untouched
    pub fn passthrough() -> Self {
        RebalanceConfig {
            function_form: FunctionForm::None,
            dynamic_form: DynamicForm::None,
            rebalance_parameter: RebalanceParameter::Fixed(0.0),
            ..Self::default()
        }
    }

    /// Create a builder starting from the default configuration
    pub fn builder() -> RebalanceConfigBuilder {
        RebalanceConfigBuilder::new()
    }

    /// Validate the configuration parameters
    pub fn validate(&self) -> Result<()> {
        if !self.sensitivity.is_finite() || self.sensitivity < 0.0 {
            return Err(RebalanceError::invalid_parameter(
                "sensitivity",
                self.sensitivity.to_string(),
                "must be a finite value >= 0.0",
            ));
        }
        if let RebalanceParameter::Fixed(value) = self.rebalance_parameter {
            if !value.is_finite() {
                return Err(RebalanceError::invalid_parameter(
                    "rebalance_parameter",
                    value.to_string(),
                    "must be finite",
                ));
            }
        }
        if self.rebalance_parameter.is_tune() {
            self.tuning.validate()?;
        }
        Ok(())
    }

    /// Whether the training set must be kept for prediction-time queries
    pub fn retains_training_set(&self) -> bool {
        self.preprocess != PreprocessForm::None || self.dynamic_form == DynamicForm::Cleanliness
    }

    /// Parse an option string such as `"-function exp -rebalance 0.8 -positive"`.
    ///
    /// Unknown options, unknown values and missing values are errors.
    pub fn from_options(options: &str) -> Result<Self> {
        let mut config = RebalanceConfig {
            function_form: FunctionForm::None,
            dynamic_form: DynamicForm::None,
            rebalance_parameter: RebalanceParameter::Fixed(0.0),
            preprocess: PreprocessForm::None,
            sensitivity: 0.0,
            ..Self::default()
        };
        let mut sign = 0.0;

        let lowered = options.to_lowercase();
        let mut tokens = lowered.split_whitespace();
        while let Some(option) = tokens.next() {
            let mut value = || {
                tokens
                    .next()
                    .ok_or_else(|| RebalanceError::config(format!("Missing value for option {}", option)))
            };

            if option.starts_with("-trained") {
                config.pretrained = true;
            } else if option.starts_with("-debug") {
                config.verbose = true;
            } else if option.starts_with("-sensitive") {
                let raw = value()?;
                config.sensitivity = raw.parse().map_err(|_| {
                    RebalanceError::invalid_parameter("sensitivity", raw, "expected a number")
                })?;
            } else if option.starts_with("-fun") {
                config.function_form = value()?.parse()?;
            } else if option.starts_with("-pre") {
                config.preprocess = value()?.parse()?;
            } else if option.starts_with("-reb") {
                config.rebalance_parameter = value()?.parse()?;
            } else if option.starts_with("-pos") {
                sign = 1.0;
            } else if option.starts_with("-neg") {
                sign = -1.0;
            } else if option.starts_with("-dyn") {
                config.dynamic_form = value()?.parse()?;
            } else {
                return Err(RebalanceError::config(format!(
                    "Unknown or malformed rebalance option: {}",
                    option
                )));
            }
        }

        if sign != 0.0 {
            if let RebalanceParameter::Fixed(value) = config.rebalance_parameter {
                config.rebalance_parameter = RebalanceParameter::Fixed(sign * value.abs());
            }
        }

        config.validate()?;
        Ok(config)
    }

    /// Configuration named by an experiment-scheme abbreviation.
    pub fn from_scheme(scheme: &str) -> Result<Self> {
        Self::from_options(&scheme_to_options(scheme)?)
    }

    /// Option string that parses back into this configuration's core
    /// settings (tuning knobs and seed are not represented).
    pub fn to_options(&self) -> String {
        let mut options = format!(
            "-function {} -dynamic {} -rebalance {} -preprocess {} -sensitive {}",
            self.function_form,
            self.dynamic_form,
            self.rebalance_parameter,
            self.preprocess,
            self.sensitivity
        );
        if self.pretrained {
            options.push_str(" -trained");
        }
        if self.verbose {
            options.push_str(" -debug");
        }
        options
    }

    /// Load configuration from a `.json` or `.toml` file
    pub fn load_from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let config: Self = super::load_from_path(path)?;
        config.validate()?;
        Ok(config)
    }

    /// Save configuration to a `.json` or `.toml` file
    pub fn save_to_file<P: AsRef<Path>>(&self, path: P) -> Result<()> {
        super::save_to_path(self, path)
    }
}

impl fmt::Display for RebalanceConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.to_options())
    }
}

impl FromStr for RebalanceConfig {
    type Err = RebalanceError;

    fn from_str(s: &str) -> Result<Self> {
        Self::from_options(s)
    }
}

/// Expand an experiment-scheme abbreviation into an option string.
///
/// The abbreviation is read left to right:
/// an optional `d` (debug);
/// an optional `u` (no logit sharpening, otherwise sensitivity 0.1);
/// the parameter: `t` for tuning, `0`, or `1` (a leading `e`, `m` or `g`
/// also implies 1);
/// the dynamic form: `e` entropy, `m` max, `g` margin, otherwise none;
/// the function: `inv`, `exp`, `lin`, `thr`, `log`, otherwise none;
/// and an optional `resample`/`sample`/`smote` suffix.
/// Anything else left over is rejected.
pub fn scheme_to_options(scheme: &str) -> Result<String> {
    let lowered = scheme.trim().to_lowercase();
    let mut abbr = lowered.as_str();
    let mut options = Vec::new();

    if let Some(rest) = abbr.strip_prefix('d') {
        options.push("-debug".to_string());
        abbr = rest;
    }

    if let Some(rest) = abbr.strip_prefix('u') {
        options.push("-sensitive 0".to_string());
        abbr = rest;
    } else {
        options.push(format!("-sensitive {}", SCHEME_SENSITIVITY));
    }

    if abbr.starts_with('t') && !abbr.starts_with("th") {
        options.push("-rebalance tune".to_string());
        abbr = &abbr[1..];
    } else if let Some(rest) = abbr.strip_prefix('1') {
        options.push("-rebalance 1".to_string());
        abbr = rest;
    } else if abbr.starts_with('e') || abbr.starts_with('m') || abbr.starts_with('g') {
        options.push("-rebalance 1".to_string());
    } else if let Some(rest) = abbr.strip_prefix('0') {
        options.push("-rebalance 0".to_string());
        abbr = rest;
    }

    let dynamic = if abbr.starts_with('e') && !abbr.starts_with("exp") {
        Some("entropy")
    } else if abbr.starts_with('m') {
        Some("max")
    } else if abbr.starts_with('g') {
        Some("margin")
    } else {
        None
    };
    match dynamic {
        Some(form) => {
            options.push(format!("-dynamic {}", form));
            abbr = &abbr[1..];
        }
        None => options.push("-dynamic none".to_string()),
    }

    let function = ["inv", "exp", "lin", "thr", "log"]
        .into_iter()
        .find(|prefix| abbr.starts_with(*prefix));
    match function {
        Some(prefix) => {
            options.push(format!("-function {}", prefix));
            abbr = &abbr[prefix.len()..];
        }
        None => options.push("-function none".to_string()),
    }

    let suffix = abbr.trim_start_matches(['-', '_']);
    let preprocess = match suffix {
        "" => "none",
        "sample" | "resample" => "resample",
        "smote" => "smote",
        _ => {
            return Err(RebalanceError::invalid_parameter(
                "scheme",
                scheme,
                format!("unrecognized trailing text '{}'", abbr),
            ))
        }
    };
    options.push(format!("-preprocess {}", preprocess));

    Ok(options.join(" "))
}

/// Builder for [`RebalanceConfig`]
#[derive(Debug, Clone, Default)]
pub struct RebalanceConfigBuilder {
    config: RebalanceConfig,
}

impl RebalanceConfigBuilder {
    /// Create a new builder with default values
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the function family
    pub fn function_form(mut self, form: FunctionForm) -> Self {
        self.config.function_form = form;
        self
    }

    /// Set the dynamic scaling
    pub fn dynamic_form(mut self, form: DynamicForm) -> Self {
        self.config.dynamic_form = form;
        self
    }

    /// Set a fixed signed rebalance parameter
    pub fn rebalance_parameter(mut self, value: f64) -> Self {
        self.config.rebalance_parameter = RebalanceParameter::Fixed(value);
        self
    }

    /// Select the parameter by search at training time
    pub fn tune(mut self) -> Self {
        self.config.rebalance_parameter = RebalanceParameter::Tune;
        self
    }

    /// Set the preprocessing
    pub fn preprocess(mut self, preprocess: PreprocessForm) -> Self {
        self.config.preprocess = preprocess;
        self
    }

    /// Set the logit-sharpening entropy threshold
    pub fn sensitivity(mut self, sensitivity: f64) -> Self {
        self.config.sensitivity = sensitivity;
        self
    }

    /// Mark the base classifier as already trained
    pub fn pretrained(mut self, pretrained: bool) -> Self {
        self.config.pretrained = pretrained;
        self
    }

    /// Enable verbose logging
    pub fn verbose(mut self, verbose: bool) -> Self {
        self.config.verbose = verbose;
        self
    }

    /// Set the preprocessing seed
    pub fn random_seed(mut self, seed: u64) -> Self {
        self.config.random_seed = seed;
        self
    }

    /// Set the tuning search settings
    pub fn tuning(mut self, tuning: TuningConfig) -> Self {
        self.config.tuning = tuning;
        self
    }

    /// Build the configuration
    pub fn build(self) -> Result<RebalanceConfig> {
        self.config.validate()?;
        Ok(self.config)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_matches_default_options() {
        let parsed =
            RebalanceConfig::from_options("-function exp -rebalance 0.8 -positive -dynamic entropy")
                .unwrap();
        assert_eq!(parsed, RebalanceConfig::default());
    }

    #[test]
    fn test_options_start_neutral() {
        let config = RebalanceConfig::from_options("").unwrap();
        assert_eq!(config.function_form, FunctionForm::None);
        assert_eq!(config.dynamic_form, DynamicForm::None);
        assert_eq!(config.rebalance_parameter, RebalanceParameter::Fixed(0.0));
        assert!(!config.pretrained);
    }

    #[test]
    fn test_sign_forcing() {
        let config = RebalanceConfig::from_options("-neg -reb 0.5").unwrap();
        assert_eq!(config.rebalance_parameter, RebalanceParameter::Fixed(-0.5));
        let config = RebalanceConfig::from_options("-reb -0.5 -positive").unwrap();
        assert_eq!(config.rebalance_parameter, RebalanceParameter::Fixed(0.5));
        let config = RebalanceConfig::from_options("-reb tune -negative").unwrap();
        assert_eq!(config.rebalance_parameter, RebalanceParameter::Tune);
    }

    #[test]
    fn test_option_flags() {
        let config =
            RebalanceConfig::from_options("-TRAINED -debug -sensitive 0.1 -pre smote -dyn clean")
                .unwrap();
        assert!(config.pretrained);
        assert!(config.verbose);
        assert_eq!(config.sensitivity, 0.1);
        assert_eq!(config.preprocess, PreprocessForm::Smote);
        assert_eq!(config.dynamic_form, DynamicForm::Cleanliness);
        assert!(config.retains_training_set());
    }

    #[test]
    fn test_malformed_options() {
        assert!(RebalanceConfig::from_options("-function cubic").is_err());
        assert!(RebalanceConfig::from_options("-dynamic").is_err());
        assert!(RebalanceConfig::from_options("-rebalance x").is_err());
        assert!(RebalanceConfig::from_options("-sensitive -1").is_err());
        assert!(RebalanceConfig::from_options("--verbose").is_err());
    }

    #[test]
    fn test_to_options_round_trip() {
        let config = RebalanceConfig::builder()
            .function_form(FunctionForm::Log)
            .dynamic_form(DynamicForm::Margin)
            .rebalance_parameter(-1.25)
            .preprocess(PreprocessForm::Resample)
            .sensitivity(0.3)
            .pretrained(true)
            .build()
            .unwrap();
        let parsed: RebalanceConfig = config.to_string().parse().unwrap();
        assert_eq!(parsed, config);
    }

    #[test]
    fn test_scheme_expansion() {
        assert_eq!(
            scheme_to_options("teexp").unwrap(),
            "-sensitive 0.1 -rebalance tune -dynamic entropy -function exp -preprocess none"
        );
        assert_eq!(
            scheme_to_options("dulin").unwrap(),
            "-debug -sensitive 0 -dynamic none -function lin -preprocess none"
        );
        assert_eq!(
            scheme_to_options("uexp").unwrap(),
            "-sensitive 0 -rebalance 1 -dynamic none -function exp -preprocess none"
        );
        assert_eq!(
            scheme_to_options("umthr").unwrap(),
            "-sensitive 0 -rebalance 1 -dynamic max -function thr -preprocess none"
        );
        assert_eq!(
            scheme_to_options("u0resample").unwrap(),
            "-sensitive 0 -rebalance 0 -dynamic none -function none -preprocess resample"
        );
    }

    #[test]
    fn test_scheme_configs() {
        let config = RebalanceConfig::from_scheme("ugexp").unwrap();
        assert_eq!(config.rebalance_parameter, RebalanceParameter::Fixed(1.0));
        assert_eq!(config.dynamic_form, DynamicForm::Margin);
        assert_eq!(config.function_form, FunctionForm::Exponential);
        assert_eq!(config.sensitivity, 0.0);

        let config = RebalanceConfig::from_scheme("tinv_smote").unwrap();
        assert!(config.rebalance_parameter.is_tune());
        assert_eq!(config.preprocess, PreprocessForm::Smote);
        assert_eq!(config.sensitivity, 0.1);

        assert!(RebalanceConfig::from_scheme("tentropyexp").is_err());
    }
}
