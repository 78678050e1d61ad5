//! Prior-aware boosting.
//!
//! [`BoostedEnsemble`] runs the boosting loop; a [`BoostingPolicy`] decides
//! which member each round trains, what data it trains on and whether
//! unhelpful rounds are kept. Three policies are provided:
//! [`UniformResamplingPolicy`], [`RebalanceSweepPolicy`] and [`ClusterPolicy`].

pub mod ensemble;
pub mod policy;

pub use ensemble::{
    BoostedEnsemble, ClusterBoost, EnsembleMember, RebalanceSweepBoost, RoundSummary,
    UniformResamplingBoost,
};
pub use policy::{
    kmeans, BoostingPolicy, ClusterPolicy, RebalanceSweepPolicy, UniformResamplingPolicy,
};
