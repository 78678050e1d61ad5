//! Integration tests for configuration parsing and persistence.

use imbalance_boost::*;
use tempfile::TempDir;

fn tuned_config() -> RebalanceConfig {
    let tuning = TuningConfig::builder()
        .bounds(-1.0, 3.0)
        .grid_size(6)
        .depth(2)
        .folds(4)
        .fairness_weight(0.5)
        .build()
        .unwrap();
    RebalanceConfig::builder()
        .function_form(FunctionForm::Inverse)
        .dynamic_form(DynamicForm::Margin)
        .tune()
        .preprocess(PreprocessForm::Smote)
        .sensitivity(0.1)
        .random_seed(99)
        .tuning(tuning)
        .build()
        .unwrap()
}

#[test]
fn test_rebalance_config_json_roundtrip() -> anyhow::Result<()> {
    let dir = TempDir::new()?;
    let path = dir.path().join("rebalance.json");
    let config = tuned_config();
    config.save_to_file(&path)?;
    assert_eq!(RebalanceConfig::load_from_file(&path)?, config);
    Ok(())
}

#[test]
fn test_rebalance_config_toml_roundtrip() -> anyhow::Result<()> {
    let dir = TempDir::new()?;
    let path = dir.path().join("rebalance.toml");
    let config = RebalanceConfig::builder()
        .function_form(FunctionForm::Log)
        .rebalance_parameter(-0.25)
        .build()?;
    config.save_to_file(&path)?;
    assert_eq!(RebalanceConfig::load_from_file(&path)?, config);
    Ok(())
}

#[test]
fn test_boosting_and_tuning_config_roundtrip() -> anyhow::Result<()> {
    let dir = TempDir::new()?;

    let boosting = BoostingConfig::builder().num_members(28).max_spread(3.0).build()?;
    let path = dir.path().join("boosting.toml");
    boosting.save_to_file(&path)?;
    assert_eq!(BoostingConfig::load_from_file(&path)?, boosting);

    let tuning = TuningConfig::builder().grid_size(4).parallel(false).build()?;
    let path = dir.path().join("tuning.json");
    tuning.save_to_file(&path)?;
    assert_eq!(TuningConfig::load_from_file(&path)?, tuning);
    Ok(())
}

#[test]
fn test_partial_file_uses_defaults() -> anyhow::Result<()> {
    let dir = TempDir::new()?;
    let path = dir.path().join("partial.json");
    std::fs::write(&path, r#"{ "function_form": "linear" }"#)?;

    let config = RebalanceConfig::load_from_file(&path)?;
    assert_eq!(config.function_form, FunctionForm::Linear);
    assert_eq!(config.dynamic_form, RebalanceConfig::default().dynamic_form);
    assert_eq!(config.tuning, TuningConfig::default());
    Ok(())
}

#[test]
fn test_unsupported_extension_is_rejected() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("rebalance.yaml");
    assert!(RebalanceConfig::default().save_to_file(&path).is_err());
    assert!(RebalanceConfig::load_from_file(&path).is_err());
}

#[test]
fn test_options_roundtrip_through_display() {
    let config = RebalanceConfig::builder()
        .function_form(FunctionForm::Threshold)
        .dynamic_form(DynamicForm::Max)
        .rebalance_parameter(1.5)
        .verbose(true)
        .build()
        .unwrap();
    let parsed: RebalanceConfig = config.to_string().parse().unwrap();
    assert_eq!(parsed, config);
}

#[test]
fn test_sign_flags_force_fixed_parameter_sign() {
    let config = RebalanceConfig::from_options("-function exp -rebalance 0.5 -negative").unwrap();
    assert_eq!(config.rebalance_parameter, RebalanceParameter::Fixed(-0.5));

    let config = RebalanceConfig::from_options("-rebalance -0.5 -positive").unwrap();
    assert_eq!(config.rebalance_parameter, RebalanceParameter::Fixed(0.5));

    let config = RebalanceConfig::from_options("-rebalance tune -negative").unwrap();
    assert_eq!(config.rebalance_parameter, RebalanceParameter::Tune);
}

#[test]
fn test_malformed_options_fail_fast() {
    assert!(RebalanceConfig::from_options("-function cubic").is_err());
    assert!(RebalanceConfig::from_options("-dynamic").is_err());
    assert!(RebalanceConfig::from_options("-rebalance lots").is_err());
    assert!(RebalanceConfig::from_options("-colour blue").is_err());
    assert!(RebalanceConfig::from_options("-sensitive -1").is_err());
}

#[test]
fn test_scheme_abbreviations() {
    let config = RebalanceConfig::from_scheme("teexp").unwrap();
    assert_eq!(config.rebalance_parameter, RebalanceParameter::Tune);
    assert_eq!(config.dynamic_form, DynamicForm::Entropy);
    assert_eq!(config.function_form, FunctionForm::Exponential);
    assert_eq!(config.sensitivity, SCHEME_SENSITIVITY);

    let config = RebalanceConfig::from_scheme("umthr").unwrap();
    assert_eq!(config.rebalance_parameter, RebalanceParameter::Fixed(1.0));
    assert_eq!(config.dynamic_form, DynamicForm::Max);
    assert_eq!(config.function_form, FunctionForm::Threshold);
    assert_eq!(config.sensitivity, 0.0);

    let config = RebalanceConfig::from_scheme("tinv_smote").unwrap();
    assert_eq!(config.function_form, FunctionForm::Inverse);
    assert_eq!(config.preprocess, PreprocessForm::Smote);

    assert!(RebalanceConfig::from_scheme("tentropyexp").is_err());
    assert!(RebalanceConfig::from_scheme("texpfoo").is_err());
}
