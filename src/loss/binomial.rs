//! Binomial deviance for 0/1 targets.

use super::{in_sample_values, GbmLoss, LossState};
use crate::core::utils::math::{nan_to_num, sigmoid};
use crate::tree::split::SplitInfo;

/// Binomial deviance loss, fitted in log-odds space.
///
/// Leaf constants use a single Newton step, `sum(r) / sum(p * (1 - p))`,
/// where `p = target - residual` is the current probability estimate.
#[derive(Debug, Clone, Copy, Default)]
pub struct BinomialLoss;

impl BinomialLoss {
    /// Creates the loss.
    pub fn new() -> Self {
        BinomialLoss
    }

    #[inline]
    fn best_constant(sum: f64, binomial_sum: f64) -> f64 {
        if binomial_sum != 0.0 {
            sum / binomial_sum
        } else {
            0.0
        }
    }

    #[inline]
    fn binomial_term(target: f64, residual: f64) -> f64 {
        (target - residual) * (1.0 - target + residual)
    }
}

impl GbmLoss for BinomialLoss {
    fn name(&self) -> &'static str {
        "binomial"
    }

    fn initial_loss(&self, targets: &[f64], in_sample: &[bool]) -> f64 {
        let (positives, count) = in_sample_values(targets, in_sample)
            .fold((0.0, 0.0), |(sum, count), target| (sum + target, count + 1.0));
        nan_to_num((positives / (count - positives)).ln())
    }

    fn init_split(&self, targets: &[f64], residuals: &[f64], in_sample: &[bool]) -> SplitInfo {
        let mut info = SplitInfo::new_empty();
        for ((&target, &residual), _) in targets
            .iter()
            .zip(residuals)
            .zip(in_sample)
            .filter(|(_, &included)| included)
        {
            info.add_residual(residual);
            info.binomial_sum += Self::binomial_term(target, residual);
        }
        info.cost = info.squared_error();
        info.best_constant = Self::best_constant(info.sum, info.binomial_sum);
        info
    }

    fn negative_gradient(&self, target: f64, prediction: f64) -> f64 {
        nan_to_num(target - sigmoid(prediction))
    }

    fn update_split_constants(
        &self,
        left: &mut SplitInfo,
        right: &mut SplitInfo,
        target: f64,
        residual: f64,
    ) {
        let binomial = Self::binomial_term(target, residual);

        left.add_residual(residual);
        left.binomial_sum += binomial;
        left.cost = left.squared_error();
        left.best_constant = Self::best_constant(left.sum, left.binomial_sum);

        right.remove_residual(residual);
        right.binomial_sum -= binomial;
        right.cost = right.squared_error();
        right.best_constant = Self::best_constant(right.sum, right.binomial_sum);
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

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn test_initial_loss_is_log_odds() {
        let loss = BinomialLoss::new();
        let all = [true; 4];
        assert_relative_eq!(loss.initial_loss(&[1.0, 1.0, 1.0, 0.0], &all), 3.0f64.ln(), epsilon = 1e-12);
        assert_eq!(loss.initial_loss(&[1.0, 0.0], &[true, true]), 0.0);
    }

    #[test]
    fn test_degenerate_initial_loss_maps_to_zero() {
        let loss = BinomialLoss::new();
        // log(0) and division by zero
        assert_eq!(loss.initial_loss(&[0.0, 0.0], &[true, true]), 0.0);
        assert_eq!(loss.initial_loss(&[1.0, 1.0], &[true, true]), 0.0);
        assert_eq!(loss.initial_loss(&[1.0], &[false]), 0.0);
    }

    #[test]
    fn test_negative_gradient() {
        let loss = BinomialLoss::new();
        assert_eq!(loss.negative_gradient(1.0, 0.0), 0.5);
        assert_eq!(loss.negative_gradient(0.0, 0.0), -0.5);
        assert_eq!(loss.negative_gradient(1.0, f64::NAN), 0.0);
    }

    #[test]
    fn test_newton_step_constant() {
        let loss = BinomialLoss::new();
        // Initial prediction 0 gives p = 0.5 everywhere.
        let targets = [1.0, 1.0, 0.0];
        let residuals: Vec<f64> = targets.iter().map(|&t| loss.negative_gradient(t, 0.0)).collect();
        let info = loss.init_split(&targets, &residuals, &[true; 3]);

        assert_relative_eq!(info.binomial_sum, 0.75, epsilon = 1e-12);
        assert_relative_eq!(info.best_constant, 0.5 / 0.75, epsilon = 1e-12);
    }

    #[test]
    fn test_empty_side_constant_is_zero() {
        let loss = BinomialLoss::new();
        let mut left = SplitInfo::new_empty();
        let mut right = loss.init_split(&[1.0], &[0.5], &[true]);
        loss.update_split_constants(&mut left, &mut right, 1.0, 0.5);

        assert_eq!(right.samples, 0);
        assert_eq!(right.best_constant, 0.0);
        assert_eq!(right.cost, 0.0);
    }
}
