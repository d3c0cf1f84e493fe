//! Least-squares loss.

use super::{in_sample_values, squared_residual_split, GbmLoss, LossState};
use crate::tree::split::SplitInfo;

/// Squared error loss. Residuals are plain differences and leaf values are
/// residual means, so no refinement pass is needed.
#[derive(Debug, Clone, Copy, Default)]
pub struct SquaredLoss;

impl SquaredLoss {
    /// Creates the loss.
    pub fn new() -> Self {
        SquaredLoss
    }
}

impl GbmLoss for SquaredLoss {
    fn name(&self) -> &'static str {
        "squared"
    }

    fn initial_loss(&self, targets: &[f64], in_sample: &[bool]) -> f64 {
        let (sum, count) = in_sample_values(targets, in_sample)
            .fold((0.0, 0usize), |(sum, count), target| (sum + target, count + 1));
        if count == 0 {
            0.0
        } else {
            sum / count as f64
        }
    }

    fn init_split(&self, _targets: &[f64], residuals: &[f64], in_sample: &[bool]) -> SplitInfo {
        let mut info = squared_residual_split(residuals, in_sample);
        info.best_constant = info.mean();
        info
    }

    fn negative_gradient(&self, target: f64, prediction: f64) -> f64 {
        target - prediction
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
        false
    }

    fn updated_leaf_value(
        &self,
        current_leaf_value: f64,
        _targets: &[f64],
        _predictions: &[f64],
        _in_sample: &[bool],
        _state: &LossState,
    ) -> f64 {
        current_leaf_value
    }
}
