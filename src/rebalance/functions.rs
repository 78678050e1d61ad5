//! Rebalance function families.
//!
//! Each family maps a class prior `f` and a predicted probability `w` to a
//! rebalanced score `F(f, w, sign)`. A positive sign favors rare classes, a
//! negative one favors frequent classes. The wrapper blends the result with
//! the original probability as `w * (1 - s) + s * F(f, w, sign)`.

use crate::core::types::FunctionForm;

impl FunctionForm {
    /// Evaluate `F(f, w, sign)`.
    pub fn evaluate(self, prior: f64, probability: f64, sign: f64) -> f64 {
        match self {
            FunctionForm::None => probability,
            FunctionForm::Exponential => {
                probability.powf((1.0 - sign) / 2.0 + sign * prior)
            }
            FunctionForm::Linear => probability * ((1.0 + sign) / 2.0 - sign * prior),
            FunctionForm::Log => (1.0 + probability).ln() * ((1.0 + sign) / 2.0 - sign * prior),
            FunctionForm::Inverse => {
                let base = if prior == 0.0 { 1.0 } else { prior };
                probability * base.powf(-sign)
            }
            FunctionForm::Threshold => (1.0 + sign) - sign * prior,
        }
    }

    /// `dF/dw` at `w = 1`.
    ///
    /// Zero for [`FunctionForm::Threshold`], which ignores `w`.
    pub fn slope_at_certainty(self, prior: f64, sign: f64) -> f64 {
        match self {
            FunctionForm::None => 1.0,
            FunctionForm::Exponential => (1.0 - sign) / 2.0 + sign * prior,
            FunctionForm::Linear => (1.0 + sign) / 2.0 - sign * prior,
            FunctionForm::Log => ((1.0 + sign) / 2.0 - sign * prior) / 2.0,
            FunctionForm::Inverse => {
                let base = if prior == 0.0 { 1.0 } else { prior };
                base.powf(-sign)
            }
            FunctionForm::Threshold => 0.0,
        }
    }

    /// Blend of the original probability and `F` at strength `s`.
    pub fn blend(self, prior: f64, probability: f64, sign: f64, strength: f64) -> f64 {
        probability * (1.0 - strength) + strength * self.evaluate(prior, probability, sign)
    }
}
