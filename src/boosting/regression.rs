//! Gradient boosting for regression.

use super::{accumulate, BoostedSeries, BoostingContext, EarlyStopping};
use crate::config::GradientBoostConfig;
use crate::core::error::{GbmError, Result};
use crate::core::types::SampleIndex;
use crate::dataset::{verify_indices, verify_observations_and_targets};
use crate::loss::{create_loss, GbmLoss};
use crate::model::RegressionGradientBoostModel;
use crate::tree::GbmTreeLearner;
use ndarray::ArrayView2;
use std::time::Instant;

/// Learns [`RegressionGradientBoostModel`]s.
///
/// The learner holds no per-call state: every `learn*` call presorts the
/// features, seeds its own random streams and builds its own worker pool,
/// so repeated calls with the same inputs return the same model.
#[derive(Debug)]
pub struct RegressionGradientBoostLearner {
    config: GradientBoostConfig,
    loss: Box<dyn GbmLoss>,
    tree_learner: GbmTreeLearner,
}

impl RegressionGradientBoostLearner {
    /// Creates a learner using the loss selected by `config.loss`.
    pub fn new(config: GradientBoostConfig) -> Result<Self> {
        config.validate()?;
        let loss = create_loss(&config.loss)?;
        Self::with_loss(config, loss)
    }

    /// Creates a learner using an explicit loss. `config.loss` is ignored.
    pub fn with_loss(config: GradientBoostConfig, loss: Box<dyn GbmLoss>) -> Result<Self> {
        config.validate()?;
        let tree_learner = GbmTreeLearner::from_config(&config)?;
        Ok(RegressionGradientBoostLearner {
            config,
            loss,
            tree_learner,
        })
    }

    /// Returns the training configuration.
    pub fn config(&self) -> &GradientBoostConfig {
        &self.config
    }

    /// Returns the loss being minimized.
    pub fn loss(&self) -> &dyn GbmLoss {
        self.loss.as_ref()
    }

    /// Fits a model on every row.
    pub fn learn(&self, observations: ArrayView2<'_, f64>, targets: &[f64]) -> Result<RegressionGradientBoostModel> {
        verify_observations_and_targets(&observations, targets)?;
        let indices: Vec<SampleIndex> = (0..targets.len()).collect();
        self.learn_indexed(observations, targets, &indices)
    }

    /// Fits a model on the rows listed in `indices`.
    ///
    /// Rows outside `indices` take no part in fitting, but their running
    /// predictions are still updated.
    pub fn learn_indexed(
        &self,
        observations: ArrayView2<'_, f64>,
        targets: &[f64],
        indices: &[SampleIndex],
    ) -> Result<RegressionGradientBoostModel> {
        verify_observations_and_targets(&observations, targets)?;
        verify_indices(indices, targets.len())?;

        let start = Instant::now();
        log::info!(
            "Training regression model: {} rows ({} in sample), {} features, {} iterations, {} loss",
            observations.nrows(),
            indices.len(),
            observations.ncols(),
            self.config.iterations,
            self.loss.name()
        );

        let mut context = BoostingContext::new(&self.config, &self.tree_learner, observations.view(), indices)?;
        let mut series = BoostedSeries::new(self.loss.as_ref(), targets, context.in_sample());

        for iteration in 1..self.config.iterations {
            series.fit_tree(&mut context)?;
            log::debug!(
                "Iteration {}: training mse {:.6}",
                iteration,
                series.training_error(context.in_sample())
            );
        }

        let initial_loss = series.initial_loss();
        let model = RegressionGradientBoostModel::new(
            series.into_trees(),
            self.config.learning_rate,
            initial_loss,
            observations.ncols(),
        );

        log::info!(
            "Trained {} trees in {:.2?}",
            model.trees().len(),
            start.elapsed()
        );
        Ok(model)
    }

    /// Fits a model while tracking a validation metric and returns the
    /// ensemble truncated to the tree count that scored best.
    ///
    /// `metric(targets, predictions)` must return an error where lower is
    /// better. It is evaluated for the constant model and then every
    /// `early_stopping_rounds` trees.
    pub fn learn_with_early_stopping(
        &self,
        training_observations: ArrayView2<'_, f64>,
        training_targets: &[f64],
        validation_observations: ArrayView2<'_, f64>,
        validation_targets: &[f64],
        metric: &dyn Fn(&[f64], &[f64]) -> f64,
        early_stopping_rounds: usize,
    ) -> Result<RegressionGradientBoostModel> {
        let mut stopping = EarlyStopping::new(early_stopping_rounds, self.config.iterations)?;
        verify_observations_and_targets(&training_observations, training_targets)?;
        verify_observations_and_targets(&validation_observations, validation_targets)?;
        crate::ensure!(
            validation_observations.ncols() == training_observations.ncols(),
            GbmError::dimension_mismatch(
                format!("{} validation features", training_observations.ncols()),
                format!("{} validation features", validation_observations.ncols()),
            )
        );

        log::info!(
            "Training regression model with early stopping every {} trees: {} training rows, {} validation rows",
            early_stopping_rounds,
            training_observations.nrows(),
            validation_observations.nrows()
        );

        let indices: Vec<SampleIndex> = (0..training_targets.len()).collect();
        let mut context =
            BoostingContext::new(&self.config, &self.tree_learner, training_observations.view(), &indices)?;
        let mut series = BoostedSeries::new(self.loss.as_ref(), training_targets, context.in_sample());

        let mut validation_predictions = vec![series.initial_loss(); validation_targets.len()];
        stopping.update(0, metric(validation_targets, &validation_predictions));

        for tree_count in 1..self.config.iterations {
            let tree = series.fit_tree(&mut context)?;
            accumulate(
                tree,
                validation_observations,
                self.config.learning_rate,
                &mut validation_predictions,
            )?;

            if stopping.is_checkpoint(tree_count) {
                stopping.update(tree_count, metric(validation_targets, &validation_predictions));
            }
        }

        let best = stopping.best_tree_count();
        log::info!(
            "Best validation error {:.6} with {} of {} trees",
            stopping.best_error(),
            best,
            series.trees().len()
        );

        let initial_loss = series.initial_loss();
        let mut trees = series.into_trees();
        trees.truncate(best);
        Ok(RegressionGradientBoostModel::new(
            trees,
            self.config.learning_rate,
            initial_loss,
            training_observations.ncols(),
        ))
    }
}
