//! Probability rebalancing around trained classifiers.
//!
//! [`RebalancingWrapper`] reshapes a base classifier's output distribution
//! with a configurable function of the class priors, optionally choosing
//! its strength by [`tune_parameter`]. [`AdaptiveClassWeights`] is a simpler
//! alternative that learns one multiplicative weight per class.

pub mod adaptive;
pub mod functions;
pub mod tuning;
pub mod wrapper;

pub use adaptive::AdaptiveClassWeights;
pub use tuning::{tune_parameter, TuningOutcome};
pub use wrapper::{RebalanceState, RebalancingWrapper};
