//! One-vs-all classification model over binomial-deviance tree series.

use super::{check_feature_count, raw_score, raw_variable_importance, scaled_variable_importance};
use crate::core::constants::BINARY_DECISION_THRESHOLD;
use crate::core::error::{GbmError, Result};
use crate::core::utils::sigmoid;
use crate::tree::GbmTree;
use ndarray::{Array1, ArrayView1, ArrayView2, Axis};
use rayon::prelude::*;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fmt;

/// Predicted class together with per-class probabilities.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProbabilityPrediction {
    /// Predicted class label
    pub prediction: f64,
    /// `(class, probability)` pairs in class order
    pub probabilities: Vec<(f64, f64)>,
}

impl ProbabilityPrediction {
    /// Probability reported for `class`, if it is one of the model's classes.
    pub fn probability_of(&self, class: f64) -> Option<f64> {
        self.probabilities
            .iter()
            .find(|(label, _)| *label == class)
            .map(|&(_, probability)| probability)
    }
}

/// Fitted gradient boosting classification model.
///
/// Binary problems hold a single tree series scoring the first class;
/// every other class count holds one series per class.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ClassificationGradientBoostModel {
    trees: Vec<Vec<GbmTree>>,
    classes: Vec<f64>,
    learning_rate: f64,
    initial_losses: Vec<f64>,
    feature_count: usize,
}

impl ClassificationGradientBoostModel {
    /// Assembles a model from per-series trees and initial constants.
    pub fn new(
        trees: Vec<Vec<GbmTree>>,
        classes: Vec<f64>,
        learning_rate: f64,
        initial_losses: Vec<f64>,
        feature_count: usize,
    ) -> Result<Self> {
        if classes.is_empty() {
            return Err(GbmError::invalid_parameter("classes", "[]", "must contain at least one class"));
        }
        let expected_series = series_count(classes.len());
        if trees.len() != expected_series || initial_losses.len() != expected_series {
            return Err(GbmError::dimension_mismatch(
                format!("{} tree series and initial losses", expected_series),
                format!("{} tree series, {} initial losses", trees.len(), initial_losses.len()),
            ));
        }

        Ok(ClassificationGradientBoostModel {
            trees,
            classes,
            learning_rate,
            initial_losses,
            feature_count,
        })
    }

    /// Predicts the class of a single observation.
    pub fn predict(&self, observation: &ArrayView1<'_, f64>) -> Result<f64> {
        let scores = self.class_scores(observation)?;
        Ok(self.decide(&scores))
    }

    /// Predicts every row of `observations`. Rows are predicted in parallel.
    pub fn predict_batch(&self, observations: ArrayView2<'_, f64>) -> Result<Array1<f64>> {
        let mut predictions = Array1::zeros(observations.nrows());
        predictions
            .axis_iter_mut(Axis(0))
            .into_par_iter()
            .zip(observations.axis_iter(Axis(0)).into_par_iter())
            .try_for_each(|(mut prediction, row)| -> Result<()> {
                prediction.fill(self.predict(&row)?);
                Ok(())
            })?;
        Ok(predictions)
    }

    /// Predicts the class of an observation along with class probabilities.
    ///
    /// Binary models report `p` for the first class and `1 - p` for the
    /// second. Multi-class models normalize the per-class sigmoid scores to
    /// sum to one; the predicted class is the same argmax either way.
    pub fn predict_probability(&self, observation: &ArrayView1<'_, f64>) -> Result<ProbabilityPrediction> {
        let scores = self.class_scores(observation)?;
        let prediction = self.decide(&scores);

        let probabilities = if self.is_binary() {
            vec![(self.classes[0], scores[0]), (self.classes[1], 1.0 - scores[0])]
        } else {
            let total: f64 = scores.iter().sum();
            self.classes
                .iter()
                .zip(&scores)
                .map(|(&class, &score)| (class, if total > 0.0 { score / total } else { 0.0 }))
                .collect()
        };

        Ok(ProbabilityPrediction {
            prediction,
            probabilities,
        })
    }

    /// Probability predictions for every row of `observations`.
    pub fn predict_probability_batch(
        &self,
        observations: ArrayView2<'_, f64>,
    ) -> Result<Vec<ProbabilityPrediction>> {
        observations
            .axis_iter(Axis(0))
            .into_par_iter()
            .map(|row| self.predict_probability(&row))
            .collect()
    }

    /// Summed cost improvement of every split in every series, per feature.
    pub fn get_raw_variable_importance(&self) -> Result<Vec<f64>> {
        raw_variable_importance(self.trees.iter().flatten(), self.feature_count)
    }

    /// Importances scaled to 0..100 and sorted descending.
    pub fn get_variable_importance(
        &self,
        feature_name_to_index: &HashMap<String, usize>,
    ) -> Result<Vec<(String, f64)>> {
        scaled_variable_importance(&self.get_raw_variable_importance()?, feature_name_to_index)
    }

    /// Tree series, one per scored class.
    pub fn trees(&self) -> &[Vec<GbmTree>] {
        &self.trees
    }

    /// Sorted class labels.
    pub fn classes(&self) -> &[f64] {
        &self.classes
    }

    /// Shrinkage applied to every tree output.
    pub fn learning_rate(&self) -> f64 {
        self.learning_rate
    }

    /// Initial log-odds of every series.
    pub fn initial_losses(&self) -> &[f64] {
        &self.initial_losses
    }

    /// Number of features observations must have.
    pub fn feature_count(&self) -> usize {
        self.feature_count
    }

    /// True for two-class models.
    pub fn is_binary(&self) -> bool {
        self.classes.len() == 2
    }

    /// Sigmoid score of every series.
    fn class_scores(&self, observation: &ArrayView1<'_, f64>) -> Result<Vec<f64>> {
        check_feature_count(observation, self.feature_count)?;
        self.trees
            .iter()
            .zip(&self.initial_losses)
            .map(|(trees, &initial)| {
                raw_score(trees, self.learning_rate, initial, observation).map(sigmoid)
            })
            .collect()
    }

    /// Class label for the per-series sigmoid scores.
    fn decide(&self, scores: &[f64]) -> f64 {
        decide_class(&self.classes, scores)
    }
}

/// Number of one-vs-all series fitted for `num_classes` classes.
pub(crate) fn series_count(num_classes: usize) -> usize {
    if num_classes == 2 {
        1
    } else {
        num_classes
    }
}

/// Thresholds a binary score or takes the first maximal multi-class score.
pub(crate) fn decide_class(classes: &[f64], scores: &[f64]) -> f64 {
    if classes.len() == 2 {
        return if scores[0] >= BINARY_DECISION_THRESHOLD {
            classes[0]
        } else {
            classes[1]
        };
    }

    let mut best = 0;
    for (index, &score) in scores.iter().enumerate() {
        if score > scores[best] {
            best = index;
        }
    }
    classes[best]
}

impl fmt::Display for ClassificationGradientBoostModel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "ClassificationGradientBoostModel(classes={}, trees_per_series={}, learning_rate={})",
            self.classes.len(),
            self.trees.first().map_or(0, Vec::len),
            self.learning_rate
        )
    }
}
