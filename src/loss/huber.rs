//! Huber loss: squared error for small residuals, absolute error beyond.

use super::{in_sample_differences, in_sample_values, squared_residual_split, GbmLoss, LossState};
use crate::core::error::{GbmError, Result};
use crate::core::utils::math::{median, score_at_percentile};
use crate::tree::split::SplitInfo;

/// Huber loss with a transition point re-estimated every iteration.
///
/// Before each tree, `gamma` is set to the `alpha` percentile of the
/// absolute in-sample residuals. Residuals inside `[-gamma, gamma]` are fitted
/// as-is and larger ones are clipped to `gamma` in magnitude. Leaf values are
/// the median difference plus the mean clipped deviation from that median.
#[derive(Debug, Clone, Copy)]
pub struct HuberLoss {
    alpha: f64,
}

impl HuberLoss {
    /// Creates the loss; `alpha` must lie in `(0, 1]`.
    pub fn new(alpha: f64) -> Result<Self> {
        if !(alpha > 0.0 && alpha <= 1.0) {
            return Err(GbmError::invalid_parameter(
                "alpha",
                alpha.to_string(),
                "must be in range (0.0, 1.0]",
            ));
        }
        Ok(HuberLoss { alpha })
    }

    /// Percentile of the absolute residuals used as the transition point.
    pub fn alpha(&self) -> f64 {
        self.alpha
    }
}

/// `value` with its magnitude capped at `gamma`.
fn clip(value: f64, gamma: f64) -> f64 {
    if value.abs() <= gamma {
        value
    } else {
        gamma * value.signum()
    }
}

impl GbmLoss for HuberLoss {
    fn name(&self) -> &'static str {
        "huber"
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

    /// Unclipped gradient; [`GbmLoss::update_residuals`] applies the clipping.
    fn negative_gradient(&self, target: f64, prediction: f64) -> f64 {
        target - prediction
    }

    fn update_residuals(
        &self,
        targets: &[f64],
        predictions: &[f64],
        residuals: &mut [f64],
        in_sample: &[bool],
    ) -> LossState {
        let magnitudes: Vec<f64> = in_sample_differences(targets, predictions, in_sample)
            .iter()
            .map(|difference| difference.abs())
            .collect();
        let gamma = score_at_percentile(&magnitudes, self.alpha);

        for (((residual, &target), &prediction), &included) in
            residuals.iter_mut().zip(targets).zip(predictions).zip(in_sample)
        {
            if included {
                *residual = clip(target - prediction, gamma);
            }
        }

        LossState { gamma }
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
        current_leaf_value: f64,
        targets: &[f64],
        predictions: &[f64],
        in_sample: &[bool],
        state: &LossState,
    ) -> f64 {
        let differences = in_sample_differences(targets, predictions, in_sample);
        if differences.is_empty() {
            return current_leaf_value;
        }

        let center = median(&differences);
        let correction = differences
            .iter()
            .map(|difference| clip(difference - center, state.gamma))
            .sum::<f64>()
            / differences.len() as f64;
        center + correction
    }
}
