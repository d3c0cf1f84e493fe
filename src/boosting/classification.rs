//! One-vs-all gradient boosting for classification.
//!
//! Targets are class labels. Two-class problems fit a single binomial
//! deviance series on the indicator of the first sorted class; other class
//! counts fit one series per class. Within an iteration the series take
//! turns, sharing the row subsampling and feature sampling streams.

use super::{accumulate, BoostedSeries, BoostingContext, EarlyStopping};
use crate::config::GradientBoostConfig;
use crate::core::error::{GbmError, Result};
use crate::core::types::SampleIndex;
use crate::core::utils::sigmoid;
use crate::dataset::{verify_indices, verify_observations_and_targets};
use crate::loss::{BinomialLoss, GbmLoss};
use crate::model::classification::{decide_class, series_count};
use crate::model::ClassificationGradientBoostModel;
use crate::tree::{GbmTree, GbmTreeLearner};
use ndarray::ArrayView2;
use std::time::Instant;

/// Learns [`ClassificationGradientBoostModel`]s.
#[derive(Debug)]
pub struct ClassificationGradientBoostLearner {
    config: GradientBoostConfig,
    loss: Box<dyn GbmLoss>,
    tree_learner: GbmTreeLearner,
}

impl ClassificationGradientBoostLearner {
    /// Creates a learner minimizing binomial deviance. `config.loss` is
    /// ignored.
    pub fn new(config: GradientBoostConfig) -> Result<Self> {
        Self::with_loss(config, Box::new(BinomialLoss::new()))
    }

    /// Creates a learner using an explicit loss for every class series.
    pub fn with_loss(config: GradientBoostConfig, loss: Box<dyn GbmLoss>) -> Result<Self> {
        config.validate()?;
        let tree_learner = GbmTreeLearner::from_config(&config)?;
        Ok(ClassificationGradientBoostLearner {
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
    pub fn learn(
        &self,
        observations: ArrayView2<'_, f64>,
        targets: &[f64],
    ) -> Result<ClassificationGradientBoostModel> {
        verify_observations_and_targets(&observations, targets)?;
        let indices: Vec<SampleIndex> = (0..targets.len()).collect();
        self.learn_indexed(observations, targets, &indices)
    }

    /// Fits a model on the rows listed in `indices`.
    pub fn learn_indexed(
        &self,
        observations: ArrayView2<'_, f64>,
        targets: &[f64],
        indices: &[SampleIndex],
    ) -> Result<ClassificationGradientBoostModel> {
        verify_observations_and_targets(&observations, targets)?;
        verify_indices(indices, targets.len())?;

        let start = Instant::now();
        let classes = sorted_classes(targets)?;
        log::info!(
            "Training classification model: {} rows ({} in sample), {} features, {} classes, {} iterations",
            observations.nrows(),
            indices.len(),
            observations.ncols(),
            classes.len(),
            self.config.iterations
        );

        let one_vs_all = one_vs_all_targets(&classes, targets);
        let mut context = BoostingContext::new(&self.config, &self.tree_learner, observations.view(), indices)?;
        let mut series: Vec<BoostedSeries<'_>> = one_vs_all
            .iter()
            .map(|class_targets| BoostedSeries::new(self.loss.as_ref(), class_targets, context.in_sample()))
            .collect();

        for iteration in 1..self.config.iterations {
            for class_series in series.iter_mut() {
                class_series.fit_tree(&mut context)?;
            }
            log::debug!(
                "Iteration {}: mean training mse over {} series {:.6}",
                iteration,
                series.len(),
                mean_training_error(&series, context.in_sample())
            );
        }

        let model = self.assemble(series, classes, observations.ncols(), None)?;
        log::info!(
            "Trained {} trees per series in {:.2?}",
            model.trees().first().map_or(0, Vec::len),
            start.elapsed()
        );
        Ok(model)
    }

    /// Fits a model while tracking a validation metric on predicted class
    /// labels and returns the ensemble truncated to the tree count that
    /// scored best.
    ///
    /// `metric(targets, predictions)` must return an error where lower is
    /// better. It is evaluated for the constant model and then every
    /// `early_stopping_rounds` iterations.
    pub fn learn_with_early_stopping(
        &self,
        training_observations: ArrayView2<'_, f64>,
        training_targets: &[f64],
        validation_observations: ArrayView2<'_, f64>,
        validation_targets: &[f64],
        metric: &dyn Fn(&[f64], &[f64]) -> f64,
        early_stopping_rounds: usize,
    ) -> Result<ClassificationGradientBoostModel> {
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

        let classes = sorted_classes(training_targets)?;
        log::info!(
            "Training classification model with early stopping every {} trees: {} training rows, {} validation rows",
            early_stopping_rounds,
            training_observations.nrows(),
            validation_observations.nrows()
        );

        let indices: Vec<SampleIndex> = (0..training_targets.len()).collect();
        let one_vs_all = one_vs_all_targets(&classes, training_targets);
        let mut context =
            BoostingContext::new(&self.config, &self.tree_learner, training_observations.view(), &indices)?;
        let mut series: Vec<BoostedSeries<'_>> = one_vs_all
            .iter()
            .map(|class_targets| BoostedSeries::new(self.loss.as_ref(), class_targets, context.in_sample()))
            .collect();

        let mut scores: Vec<Vec<f64>> = series
            .iter()
            .map(|class_series| vec![class_series.initial_loss(); validation_targets.len()])
            .collect();
        stopping.update(0, metric(validation_targets, &label_predictions(&classes, &scores)));

        for tree_count in 1..self.config.iterations {
            for (class_series, class_scores) in series.iter_mut().zip(scores.iter_mut()) {
                let tree = class_series.fit_tree(&mut context)?;
                accumulate(tree, validation_observations, self.config.learning_rate, class_scores)?;
            }

            if stopping.is_checkpoint(tree_count) {
                let labels = label_predictions(&classes, &scores);
                stopping.update(tree_count, metric(validation_targets, &labels));
            }
        }

        log::info!(
            "Best validation error {:.6} with {} of {} trees per series",
            stopping.best_error(),
            stopping.best_tree_count(),
            self.config.num_trees()
        );

        self.assemble(
            series,
            classes,
            training_observations.ncols(),
            Some(stopping.best_tree_count()),
        )
    }

    fn assemble(
        &self,
        series: Vec<BoostedSeries<'_>>,
        classes: Vec<f64>,
        feature_count: usize,
        keep_trees: Option<usize>,
    ) -> Result<ClassificationGradientBoostModel> {
        let initial_losses: Vec<f64> = series.iter().map(BoostedSeries::initial_loss).collect();
        let trees: Vec<Vec<GbmTree>> = series
            .into_iter()
            .map(|class_series| {
                let mut trees = class_series.into_trees();
                if let Some(keep) = keep_trees {
                    trees.truncate(keep);
                }
                trees
            })
            .collect();

        ClassificationGradientBoostModel::new(
            trees,
            classes,
            self.config.learning_rate,
            initial_losses,
            feature_count,
        )
    }
}

/// Distinct target values, ascending.
fn sorted_classes(targets: &[f64]) -> Result<Vec<f64>> {
    if let Some(bad) = targets.iter().find(|target| !target.is_finite()) {
        return Err(GbmError::invalid_parameter(
            "targets",
            bad.to_string(),
            "class labels must be finite",
        ));
    }

    let mut classes = targets.to_vec();
    classes.sort_by(f64::total_cmp);
    classes.dedup();

    if classes.len() < 2 {
        log::warn!(
            "Only one class ({:?}) in the targets; the model will always predict it",
            classes
        );
    }
    Ok(classes)
}

/// 0/1 indicator targets of every fitted series.
fn one_vs_all_targets(classes: &[f64], targets: &[f64]) -> Vec<Vec<f64>> {
    classes
        .iter()
        .take(series_count(classes.len()))
        .map(|&class| {
            targets
                .iter()
                .map(|&target| if target == class { 1.0 } else { 0.0 })
                .collect()
        })
        .collect()
}

/// Class labels for running raw scores laid out as `scores[series][row]`.
fn label_predictions(classes: &[f64], scores: &[Vec<f64>]) -> Vec<f64> {
    let rows = scores.first().map_or(0, Vec::len);
    let mut row_scores = vec![0.0; scores.len()];
    (0..rows)
        .map(|row| {
            for (score, series) in row_scores.iter_mut().zip(scores) {
                *score = sigmoid(series[row]);
            }
            decide_class(classes, &row_scores)
        })
        .collect()
}

fn mean_training_error(series: &[BoostedSeries<'_>], in_sample: &[bool]) -> f64 {
    if series.is_empty() {
        return 0.0;
    }
    series
        .iter()
        .map(|class_series| class_series.training_error(in_sample))
        .sum::<f64>()
        / series.len() as f64
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::GradientBoostConfigBuilder;
    use ndarray::Array2;

    fn config(iterations: usize) -> GradientBoostConfig {
        GradientBoostConfigBuilder::new()
            .iterations(iterations)
            .learning_rate(0.3)
            .maximum_tree_depth(3)
            .num_threads(1)
            .build()
            .unwrap()
    }

    /// Three well separated bands along the first feature.
    fn bands() -> (Array2<f64>, Vec<f64>) {
        let rows = 30;
        let observations = Array2::from_shape_fn((rows, 2), |(i, j)| if j == 0 { i as f64 } else { (i % 4) as f64 });
        let targets = (0..rows).map(|i| (i / 10) as f64 + 1.0).collect();
        (observations, targets)
    }

    fn error_rate(targets: &[f64], predictions: &[f64]) -> f64 {
        let wrong = targets.iter().zip(predictions).filter(|(t, p)| t != p).count();
        wrong as f64 / targets.len() as f64
    }

    #[test]
    fn test_sorted_classes() {
        assert_eq!(sorted_classes(&[3.0, 1.0, 3.0, 2.0]).unwrap(), vec![1.0, 2.0, 3.0]);
        assert!(sorted_classes(&[1.0, f64::NAN]).is_err());
    }

    #[test]
    fn test_one_vs_all_targets() {
        assert_eq!(one_vs_all_targets(&[0.0, 1.0], &[1.0, 0.0, 0.0]), vec![vec![0.0, 1.0, 1.0]]);
        assert_eq!(one_vs_all_targets(&[0.0, 1.0, 2.0], &[2.0, 0.0]).len(), 3);
    }

    #[test]
    fn test_label_predictions() {
        let labels = label_predictions(&[5.0, 6.0], &[vec![2.0, -2.0]]);
        assert_eq!(labels, vec![5.0, 6.0]);
    }

    #[test]
    fn test_multi_class_bands_are_learned() {
        let (observations, targets) = bands();
        let model = ClassificationGradientBoostLearner::new(config(30))
            .unwrap()
            .learn(observations.view(), &targets)
            .unwrap();

        assert_eq!(model.classes(), &[1.0, 2.0, 3.0]);
        assert_eq!(model.trees().len(), 3);
        assert!(model.trees().iter().all(|series| series.len() == 29));

        let predictions = model.predict_batch(observations.view()).unwrap();
        assert_eq!(error_rate(&targets, predictions.as_slice().unwrap()), 0.0);
    }

    #[test]
    fn test_binary_fits_single_series() {
        let (observations, targets) = bands();
        let binary: Vec<f64> = targets.iter().map(|&t| if t == 1.0 { 0.0 } else { 1.0 }).collect();
        let model = ClassificationGradientBoostLearner::new(config(10))
            .unwrap()
            .learn(observations.view(), &binary)
            .unwrap();

        assert!(model.is_binary());
        assert_eq!(model.trees().len(), 1);
        assert_eq!(model.initial_losses().len(), 1);
        // Ten of thirty rows are class 0.
        assert!((model.initial_losses()[0] - (10.0f64 / 20.0).ln()).abs() < 1e-12);
    }

    #[test]
    fn test_early_stopping_keeps_checkpoint_tree_count() {
        let (observations, targets) = bands();
        let learner = ClassificationGradientBoostLearner::new(config(13)).unwrap();
        let model = learner
            .learn_with_early_stopping(
                observations.view(),
                &targets,
                observations.view(),
                &targets,
                &error_rate,
                4,
            )
            .unwrap();
        let kept = model.trees()[0].len();
        assert!(kept % 4 == 0 && kept <= 12);
        assert!(model.trees().iter().all(|series| series.len() == kept));
    }
}
