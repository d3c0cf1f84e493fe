//! Pinball loss for quantile regression.

use super::{in_sample_differences, in_sample_values, squared_residual_split, GbmLoss, LossState};
use crate::core::error::{GbmError, Result};
use crate::core::utils::math::score_at_percentile;
use crate::tree::split::SplitInfo;

/// Quantile loss for the `alpha` quantile.
#[derive(Debug, Clone, Copy)]
pub struct QuantileLoss {
    alpha: f64,
}

impl QuantileLoss {
    /// Creates the loss; `alpha` must lie in `(0, 1]`.
    pub fn new(alpha: f64) -> Result<Self> {
        if !(alpha > 0.0 && alpha <= 1.0) {
            return Err(GbmError::invalid_parameter(
                "alpha",
                alpha.to_string(),
                "must be in range (0.0, 1.0]",
            ));
        }
        Ok(QuantileLoss { alpha })
    }

    /// Target quantile.
    pub fn alpha(&self) -> f64 {
        self.alpha
    }
}

impl GbmLoss for QuantileLoss {
    fn name(&self) -> &'static str {
        "quantile"
    }

    fn initial_loss(&self, targets: &[f64], in_sample: &[bool]) -> f64 {
        let values: Vec<f64> = in_sample_values(targets, in_sample).collect();
        score_at_percentile(&values, self.alpha)
    }

    fn init_split(&self, _targets: &[f64], residuals: &[f64], in_sample: &[bool]) -> SplitInfo {
        let mut info = squared_residual_split(residuals, in_sample);
        info.best_constant = info.mean();
        info
    }

    fn negative_gradient(&self, target: f64, prediction: f64) -> f64 {
        if target > prediction {
            self.alpha
        } else {
            -(1.0 - self.alpha)
        }
    }

    fn update_split_constants(
        &self,
        left: &mut SplitInfo,
        right: &mut SplitInfo,
        _target: f64,
        residual: f64,
    ) {
        left.add_residual(residual);
        left.cost = left.squared_error();
        left.best_constant = left.mean();

        right.remove_residual(residual);
        right.cost = right.squared_error();
        right.best_constant = right.mean();
    }

    fn update_leaf_values(&self) -> bool {
        true
    }

    fn updated_leaf_value(
        &self,
        _current_leaf_value: f64,
        targets: &[f64],
        predictions: &[f64],
        in_sample: &[bool],
        _state: &LossState,
    ) -> f64 {
        score_at_percentile(&in_sample_differences(targets, predictions, in_sample), self.alpha)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_alpha_validation() {
        assert!(QuantileLoss::new(0.0).is_err());
        assert!(QuantileLoss::new(-0.1).is_err());
        assert!(QuantileLoss::new(1.01).is_err());
        assert_eq!(QuantileLoss::new(1.0).unwrap().alpha(), 1.0);
    }

    #[test]
    fn test_gradient_is_asymmetric() {
        let loss = QuantileLoss::new(0.9).unwrap();
        assert_eq!(loss.negative_gradient(2.0, 1.0), 0.9);
        assert!((loss.negative_gradient(1.0, 2.0) + 0.1).abs() < 1e-12);
    }

    #[test]
    fn test_initial_and_leaf_values_use_percentile() {
        let loss = QuantileLoss::new(0.5).unwrap();
        let targets = [1.0, 2.0, 3.0, 4.0, 5.0];
        let all = [true; 5];
        assert_eq!(loss.initial_loss(&targets, &all), 3.0);
        assert_eq!(loss.updated_leaf_value(0.0, &targets, &[1.0; 5], &all, &LossState::default()), 2.0);
    }
}
