//! Tree learner fitting one regression tree to the current residuals.
//!
//! [`GbmTreeLearner`] holds the stopping rules of a tree. The actual node
//! expansion lives in [`growth`], which processes nodes one at a time from
//! a FIFO queue and fans the split search of each node out over features.

mod growth;

use crate::config::GradientBoostConfig;
use crate::core::error::{GbmError, Result};
use crate::core::utils::WorkerPool;
use crate::dataset::OrderedIndices;
use crate::loss::{GbmLoss, LossState};
use crate::tree::sampling::FeatureSampler;
use crate::tree::tree::GbmTree;
use ndarray::ArrayView2;

/// Read-only inputs of one tree fit.
#[derive(Debug, Clone, Copy)]
pub struct TreeTrainingData<'a> {
    /// Observation matrix, one row per sample
    pub observations: ArrayView2<'a, f64>,
    /// Original targets
    pub targets: &'a [f64],
    /// Pseudo-residuals the tree is fitted to
    pub residuals: &'a [f64],
    /// Current ensemble predictions, used by leaf refinement
    pub predictions: &'a [f64],
    /// Presorted sample order of every feature
    pub ordered: &'a OrderedIndices,
    /// State returned by the loss's residual update for this iteration
    pub loss_state: LossState,
}

impl<'a> TreeTrainingData<'a> {
    /// Checks that every per-sample slice matches the observation rows.
    pub fn validate(&self) -> Result<()> {
        let rows = self.observations.nrows();
        for (name, len) in [
            ("targets", self.targets.len()),
            ("residuals", self.residuals.len()),
            ("predictions", self.predictions.len()),
            ("ordered indices", self.ordered.num_samples()),
        ] {
            if len != rows {
                return Err(GbmError::dimension_mismatch(
                    format!("{} {}", rows, name),
                    format!("{} {}", len, name),
                ));
            }
        }

        if self.ordered.num_features() != self.observations.ncols() {
            return Err(GbmError::dimension_mismatch(
                format!("{} presorted features", self.observations.ncols()),
                format!("{} presorted features", self.ordered.num_features()),
            ));
        }

        Ok(())
    }
}

/// Regression tree learner used by the boosting loop.
#[derive(Debug, Clone, PartialEq)]
pub struct GbmTreeLearner {
    maximum_tree_depth: usize,
    minimum_split_size: usize,
    minimum_information_gain: f64,
}

impl GbmTreeLearner {
    /// Creates a learner with the given stopping rules.
    pub fn new(
        maximum_tree_depth: usize,
        minimum_split_size: usize,
        minimum_information_gain: f64,
    ) -> Result<Self> {
        if maximum_tree_depth == 0 {
            return Err(GbmError::invalid_parameter(
                "maximum_tree_depth",
                maximum_tree_depth.to_string(),
                "must be at least 1",
            ));
        }
        if minimum_split_size == 0 {
            return Err(GbmError::invalid_parameter(
                "minimum_split_size",
                minimum_split_size.to_string(),
                "must be at least 1",
            ));
        }
        if !(minimum_information_gain > 0.0) {
            return Err(GbmError::invalid_parameter(
                "minimum_information_gain",
                minimum_information_gain.to_string(),
                "must be positive",
            ));
        }

        Ok(GbmTreeLearner {
            maximum_tree_depth,
            minimum_split_size,
            minimum_information_gain,
        })
    }

    /// Creates a learner from the tree settings of a boosting config.
    pub fn from_config(config: &GradientBoostConfig) -> Result<Self> {
        Self::new(
            config.maximum_tree_depth,
            config.minimum_split_size,
            config.minimum_information_gain,
        )
    }

    /// Returns the maximum tree depth.
    pub fn maximum_tree_depth(&self) -> usize {
        self.maximum_tree_depth
    }

    /// Returns the minimum number of samples on each side of a split.
    pub fn minimum_split_size(&self) -> usize {
        self.minimum_split_size
    }

    /// Returns the minimum cost improvement for a split to be expanded.
    pub fn minimum_information_gain(&self) -> f64 {
        self.minimum_information_gain
    }

    /// Fits a tree to `data.residuals` over the samples in `in_sample`.
    pub fn learn(
        &self,
        data: &TreeTrainingData<'_>,
        in_sample: &[bool],
        sampler: &mut FeatureSampler,
        pool: &WorkerPool,
        loss: &dyn GbmLoss,
    ) -> Result<GbmTree> {
        data.validate()?;
        if in_sample.len() != data.observations.nrows() {
            return Err(GbmError::dimension_mismatch(
                format!("in-sample mask of length {}", data.observations.nrows()),
                format!("length {}", in_sample.len()),
            ));
        }

        growth::grow(self, data, in_sample, sampler, pool, loss)
    }
}
