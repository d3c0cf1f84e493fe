//! Staged boosting loop shared by the regression and classification learners.
//!
//! A [`BoostingContext`] owns everything one training call shares between
//! target series: the presorted features, the worker pool and both random
//! streams. A [`BoostedSeries`] owns the running predictions, residuals and
//! trees of one target series. Regression boosts a single series; one-vs-all
//! classification boosts one series per class, interleaving the classes
//! within every iteration.

pub mod classification;
pub mod early_stopping;
pub mod regression;
pub mod sampling;

pub use classification::ClassificationGradientBoostLearner;
pub use early_stopping::EarlyStopping;
pub use regression::RegressionGradientBoostLearner;
pub use sampling::SubSampler;

use crate::config::GradientBoostConfig;
use crate::core::constants::FEATURE_SAMPLING_SEED;
use crate::core::error::Result;
use crate::core::types::SampleIndex;
use crate::core::utils::WorkerPool;
use crate::dataset::{in_sample_mask, OrderedIndices};
use crate::loss::GbmLoss;
use crate::tree::{FeatureSampler, GbmTree, GbmTreeLearner, TreeTrainingData};
use ndarray::ArrayView2;

/// State shared by every series of one training call.
pub(crate) struct BoostingContext<'a> {
    observations: ArrayView2<'a, f64>,
    ordered: OrderedIndices,
    tree_learner: &'a GbmTreeLearner,
    learning_rate: f64,
    pool: WorkerPool,
    feature_sampler: FeatureSampler,
    sub_sampler: SubSampler,
    in_sample: Vec<bool>,
    work_indices: Vec<SampleIndex>,
}

impl<'a> BoostingContext<'a> {
    /// Presorts the features and seeds both random streams.
    pub(crate) fn new(
        config: &GradientBoostConfig,
        tree_learner: &'a GbmTreeLearner,
        observations: ArrayView2<'a, f64>,
        indices: &[SampleIndex],
    ) -> Result<Self> {
        let pool = WorkerPool::new(config.effective_num_threads())?;
        let ordered = OrderedIndices::new(observations);

        Ok(BoostingContext {
            observations,
            ordered,
            tree_learner,
            learning_rate: config.learning_rate,
            pool,
            feature_sampler: FeatureSampler::new(config.features_per_split, FEATURE_SAMPLING_SEED),
            sub_sampler: SubSampler::new(config.sub_sample_ratio, config.seed),
            in_sample: in_sample_mask(indices, observations.nrows()),
            work_indices: indices.to_vec(),
        })
    }

    /// Rows the training call may use.
    pub(crate) fn in_sample(&self) -> &[bool] {
        &self.in_sample
    }
}

/// Running state of one boosted target series.
pub(crate) struct BoostedSeries<'a> {
    loss: &'a dyn GbmLoss,
    targets: &'a [f64],
    initial_loss: f64,
    predictions: Vec<f64>,
    residuals: Vec<f64>,
    trees: Vec<GbmTree>,
}

impl<'a> BoostedSeries<'a> {
    /// Starts a series at the constant model over the in-sample targets.
    pub(crate) fn new(loss: &'a dyn GbmLoss, targets: &'a [f64], in_sample: &[bool]) -> Self {
        let initial_loss = loss.initial_loss(targets, in_sample);
        BoostedSeries {
            loss,
            targets,
            initial_loss,
            predictions: vec![initial_loss; targets.len()],
            residuals: vec![0.0; targets.len()],
            trees: Vec::new(),
        }
    }

    /// Fits the next tree to the current residuals and updates the
    /// predictions of every row, in sample or not.
    pub(crate) fn fit_tree(&mut self, context: &mut BoostingContext<'_>) -> Result<&GbmTree> {
        let loss_state = self.loss.update_residuals(
            self.targets,
            &self.predictions,
            &mut self.residuals,
            &context.in_sample,
        );

        let sampled;
        let in_sample: &[bool] = if context.sub_sampler.is_full() {
            &context.in_sample
        } else {
            sampled = context
                .sub_sampler
                .sample(&mut context.work_indices, context.observations.nrows());
            &sampled
        };

        let data = TreeTrainingData {
            observations: context.observations.view(),
            targets: self.targets,
            residuals: &self.residuals,
            predictions: &self.predictions,
            ordered: &context.ordered,
            loss_state,
        };
        let tree = context.tree_learner.learn(
            &data,
            in_sample,
            &mut context.feature_sampler,
            &context.pool,
            self.loss,
        )?;

        let mut tree_predictions = vec![0.0; self.predictions.len()];
        tree.predict_into(context.observations, &mut tree_predictions)?;
        for (prediction, update) in self.predictions.iter_mut().zip(&tree_predictions) {
            *prediction += context.learning_rate * update;
        }

        self.trees.push(tree);
        Ok(&self.trees[self.trees.len() - 1])
    }

    /// Mean loss-agnostic squared residual over the in-sample rows, for logs.
    pub(crate) fn training_error(&self, in_sample: &[bool]) -> f64 {
        let (sum, count) = self
            .targets
            .iter()
            .zip(&self.predictions)
            .zip(in_sample)
            .filter(|(_, &included)| included)
            .fold((0.0, 0usize), |(sum, count), ((&target, &prediction), _)| {
                let error = target - prediction;
                (sum + error * error, count + 1)
            });
        if count == 0 {
            0.0
        } else {
            sum / count as f64
        }
    }

    /// Constant the series started from.
    pub(crate) fn initial_loss(&self) -> f64 {
        self.initial_loss
    }

    /// Trees fitted so far.
    pub(crate) fn trees(&self) -> &[GbmTree] {
        &self.trees
    }

    /// Consumes the series and returns its trees.
    pub(crate) fn into_trees(self) -> Vec<GbmTree> {
        self.trees
    }
}

/// Adds `learning_rate * tree(x)` to every running validation score.
pub(crate) fn accumulate(
    tree: &GbmTree,
    observations: ArrayView2<'_, f64>,
    learning_rate: f64,
    scores: &mut [f64],
) -> Result<()> {
    let mut work = vec![0.0; scores.len()];
    tree.predict_into(observations, &mut work)?;
    for (score, update) in scores.iter_mut().zip(&work) {
        *score += learning_rate * update;
    }
    Ok(())
}
