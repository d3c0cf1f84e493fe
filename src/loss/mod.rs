//! Loss functions for gradient boosting.
//!
//! A loss defines the constant model the ensemble starts from, the
//! pseudo-residuals every tree is fitted to, and how the split search keeps
//! its [`SplitInfo`] aggregates up to date while samples move from one side
//! of a candidate split to the other. Losses whose optimal leaf value is not
//! a function of those running sums (medians, quantiles) request a refinement
//! pass over the final leaf membership through [`GbmLoss::update_leaf_values`].

mod absolute;
mod binomial;
mod huber;
mod quantile;
mod squared;

pub use absolute::AbsoluteLoss;
pub use binomial::BinomialLoss;
pub use huber::HuberLoss;
pub use quantile::QuantileLoss;
pub use squared::SquaredLoss;

use crate::config::LossConfig;
use crate::core::error::Result;
use crate::tree::split::SplitInfo;
use std::fmt;

/// Per-iteration values a loss derives while updating the residuals of a
/// series and reads back when refining that iteration's leaf values.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct LossState {
    /// Residual magnitude where Huber loss switches from squared to absolute
    pub gamma: f64,
}

/// Strategy interface implemented by every loss function.
///
/// Implementations are stateless, so one instance may be shared by all
/// worker threads of a split search. Anything a loss derives from the whole
/// series is returned as a [`LossState`] and owned by the caller.
pub trait GbmLoss: fmt::Debug + Send + Sync {
    /// Short identifier used in logs.
    fn name(&self) -> &'static str;

    /// Constant prediction minimizing the loss over the in-sample targets.
    fn initial_loss(&self, targets: &[f64], in_sample: &[bool]) -> f64;

    /// Aggregates the in-sample residuals into the statistics of a node.
    fn init_split(&self, targets: &[f64], residuals: &[f64], in_sample: &[bool]) -> SplitInfo;

    /// Pseudo-residual for one sample.
    fn negative_gradient(&self, target: f64, prediction: f64) -> f64;

    /// Recomputes every residual from the current predictions and returns
    /// the state leaf refinement needs for this iteration.
    fn update_residuals(
        &self,
        targets: &[f64],
        predictions: &[f64],
        residuals: &mut [f64],
        _in_sample: &[bool],
    ) -> LossState {
        for ((residual, &target), &prediction) in
            residuals.iter_mut().zip(targets).zip(predictions)
        {
            *residual = self.negative_gradient(target, prediction);
        }
        LossState::default()
    }

    /// Moves one sample from `right` to `left` and refreshes both sides'
    /// cost and best constant.
    fn update_split_constants(
        &self,
        left: &mut SplitInfo,
        right: &mut SplitInfo,
        target: f64,
        residual: f64,
    );

    /// True when leaf constants must be recomputed with
    /// [`GbmLoss::updated_leaf_value`] once leaf membership is known.
    fn update_leaf_values(&self) -> bool;

    /// Refined constant for the samples in `in_sample`.
    fn updated_leaf_value(
        &self,
        current_leaf_value: f64,
        targets: &[f64],
        predictions: &[f64],
        in_sample: &[bool],
        state: &LossState,
    ) -> f64;
}

/// Instantiates the loss selected by `config`.
pub fn create_loss(config: &LossConfig) -> Result<Box<dyn GbmLoss>> {
    config.validate()?;
    let loss: Box<dyn GbmLoss> = match *config {
        LossConfig::Squared => Box::new(SquaredLoss::new()),
        LossConfig::Absolute => Box::new(AbsoluteLoss::new()),
        LossConfig::Binomial => Box::new(BinomialLoss::new()),
        LossConfig::Quantile { alpha } => Box::new(QuantileLoss::new(alpha)?),
        LossConfig::Huber { alpha } => Box::new(HuberLoss::new(alpha)?),
    };
    Ok(loss)
}

/// In-sample values of `values`.
fn in_sample_values<'a>(values: &'a [f64], in_sample: &'a [bool]) -> impl Iterator<Item = f64> + 'a {
    values
        .iter()
        .zip(in_sample)
        .filter(|(_, &included)| included)
        .map(|(&value, _)| value)
}

/// `target - prediction` for every in-sample row.
fn in_sample_differences(targets: &[f64], predictions: &[f64], in_sample: &[bool]) -> Vec<f64> {
    targets
        .iter()
        .zip(predictions)
        .zip(in_sample)
        .filter(|(_, &included)| included)
        .map(|((&target, &prediction), _)| target - prediction)
        .collect()
}

/// Sum of squared residuals over a plain residual aggregate.
fn squared_residual_split(residuals: &[f64], in_sample: &[bool]) -> SplitInfo {
    let mut info = SplitInfo::new_empty();
    for residual in in_sample_values(residuals, in_sample) {
        info.add_residual(residual);
    }
    info.cost = info.squared_error();
    info
}
