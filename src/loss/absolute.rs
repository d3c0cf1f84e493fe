//! Least absolute deviation loss.

use super::{in_sample_differences, in_sample_values, squared_residual_split, GbmLoss, LossState};
use crate::core::utils::math::median;
use crate::core::utils::RunningMedian;
use crate::tree::split::SplitInfo;

/// Absolute error loss.
///
/// Trees are grown on the sign of the residual with squared-error split
/// costs; the constant of every leaf is then replaced by the median of
/// `target - prediction` over the samples that reached it.
#[derive(Debug, Clone, Copy, Default)]
pub struct AbsoluteLoss;

impl AbsoluteLoss {
    /// Creates the loss.
    pub fn new() -> Self {
        AbsoluteLoss
    }
}

impl GbmLoss for AbsoluteLoss {
    fn name(&self) -> &'static str {
        "absolute"
    }

    fn initial_loss(&self, targets: &[f64], in_sample: &[bool]) -> f64 {
        let values: Vec<f64> = in_sample_values(targets, in_sample).collect();
        median(&values)
    }

    fn init_split(&self, _targets: &[f64], residuals: &[f64], in_sample: &[bool]) -> SplitInfo {
        let mut info = squared_residual_split(residuals, in_sample);
        info.best_constant = info.mean();
        info
    }

    fn negative_gradient(&self, target: f64, prediction: f64) -> f64 {
        if target - prediction > 0.0 {
            1.0
        } else {
            -1.0
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
        in_sample_differences(targets, predictions, in_sample)
            .into_iter()
            .collect::<RunningMedian>()
            .median()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_initial_loss_is_median() {
        let loss = AbsoluteLoss::new();
        assert_eq!(loss.initial_loss(&[1.0, 100.0, 3.0, 2.0], &[true, true, true, false]), 3.0);
    }

    #[test]
    fn test_negative_gradient_is_sign() {
        let loss = AbsoluteLoss::new();
        assert_eq!(loss.negative_gradient(5.0, 1.0), 1.0);
        assert_eq!(loss.negative_gradient(1.0, 5.0), -1.0);
        assert_eq!(loss.negative_gradient(1.0, 1.0), -1.0);
    }

    #[test]
    fn test_leaf_value_is_median_difference() {
        let loss = AbsoluteLoss::new();
        assert!(loss.update_leaf_values());
        let value = loss.updated_leaf_value(
            0.0,
            &[10.0, 4.0, 7.0, 1.0],
            &[1.0, 1.0, 1.0, 1.0],
            &[true, true, true, false],
            &LossState::default(),
        );
        assert_eq!(value, 6.0);
    }

    #[test]
    fn test_leaf_value_matches_sorted_median() {
        let loss = AbsoluteLoss::new();
        let targets = [10.0, 4.0, 7.0, 1.0];
        let predictions = [1.0; 4];
        let state = LossState::default();

        let even = loss.updated_leaf_value(0.0, &targets, &predictions, &[true; 4], &state);
        assert_eq!(even, 4.5);
        assert_eq!(even, median(&[9.0, 3.0, 6.0, 0.0]));
        assert_eq!(loss.updated_leaf_value(2.0, &targets, &predictions, &[false; 4], &state), 0.0);
    }
}
