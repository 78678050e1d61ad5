//! Named classifier construction.
//!
//! Base learners live outside this crate. A [`ClassifierRegistry`] maps
//! names to constructors so experiments can refer to classifiers by name
//! and optionally wrap them in a rebalancing scheme.

use crate::config::RebalanceConfig;
use crate::config_error;
use crate::core::error::Result;
use crate::core::traits::Classifier;
use crate::rebalance::RebalancingWrapper;
use std::collections::BTreeMap;
use std::fmt;

type Constructor = Box<dyn Fn() -> Box<dyn Classifier> + Send + Sync>;

/// Name-to-constructor map for classifiers.
#[derive(Default)]
pub struct ClassifierRegistry {
    constructors: BTreeMap<String, Constructor>,
}

impl fmt::Debug for ClassifierRegistry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ClassifierRegistry")
            .field("names", &self.names())
            .finish()
    }
}

impl ClassifierRegistry {
    /// Empty registry
    pub fn new() -> Self {
        Self::default()
    }

    /// Register `constructor` under `name` (case-insensitive), replacing any
    /// previous entry.
    pub fn register<F>(&mut self, name: &str, constructor: F) -> &mut Self
    where
        F: Fn() -> Box<dyn Classifier> + Send + Sync + 'static,
    {
        self.constructors
            .insert(name.to_lowercase(), Box::new(constructor));
        self
    }

    /// Registered names in sorted order
    pub fn names(&self) -> Vec<&str> {
        self.constructors.keys().map(String::as_str).collect()
    }

    /// Whether `name` is registered
    pub fn contains(&self, name: &str) -> bool {
        self.constructors.contains_key(&name.to_lowercase())
    }

    /// Fresh untrained classifier registered under `name`.
    pub fn create(&self, name: &str) -> Result<Box<dyn Classifier>> {
        self.constructors
            .get(&name.to_lowercase())
            .map(|constructor| constructor())
            .ok_or_else(|| config_error!("Unknown classifier: {}", name))
    }

    /// Classifier `name` wrapped by the rebalancing scheme abbreviation
    /// `scheme`, or unwrapped when `scheme` is empty.
    pub fn create_with_scheme(&self, name: &str, scheme: &str) -> Result<Box<dyn Classifier>> {
        let base = self.create(name)?;
        if scheme.trim().is_empty() {
            return Ok(base);
        }
        let config = RebalanceConfig::from_scheme(scheme)?;
        Ok(Box::new(RebalancingWrapper::new(base, config)?))
    }

    /// Classifier `name` wrapped with an explicit option string.
    pub fn create_with_options(&self, name: &str, options: &str) -> Result<Box<dyn Classifier>> {
        let config = RebalanceConfig::from_options(options)?;
        Ok(Box::new(RebalancingWrapper::new(self.create(name)?, config)?))
    }
}
