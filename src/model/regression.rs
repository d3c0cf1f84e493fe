//! Regression model: initial constant plus shrunken tree outputs.

use super::{check_feature_count, raw_score, raw_variable_importance, scaled_variable_importance};
use crate::core::error::Result;
use crate::tree::GbmTree;
use ndarray::{Array1, ArrayView1, ArrayView2, Axis};
use rayon::prelude::*;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fmt;

/// Fitted gradient boosting regression model.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RegressionGradientBoostModel {
    trees: Vec<GbmTree>,
    learning_rate: f64,
    initial_loss: f64,
    feature_count: usize,
}

impl RegressionGradientBoostModel {
    /// Assembles a model from fitted trees.
    pub fn new(trees: Vec<GbmTree>, learning_rate: f64, initial_loss: f64, feature_count: usize) -> Self {
        RegressionGradientBoostModel {
            trees,
            learning_rate,
            initial_loss,
            feature_count,
        }
    }

    /// Predicts a single observation.
    pub fn predict(&self, observation: &ArrayView1<'_, f64>) -> Result<f64> {
        check_feature_count(observation, self.feature_count)?;
        raw_score(&self.trees, self.learning_rate, self.initial_loss, observation)
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

    /// Summed cost improvement of every split, per feature.
    pub fn get_raw_variable_importance(&self) -> Result<Vec<f64>> {
        raw_variable_importance(&self.trees, self.feature_count)
    }

    /// Importances scaled to 0..100 and sorted descending.
    pub fn get_variable_importance(
        &self,
        feature_name_to_index: &HashMap<String, usize>,
    ) -> Result<Vec<(String, f64)>> {
        scaled_variable_importance(&self.get_raw_variable_importance()?, feature_name_to_index)
    }

    /// Fitted trees in boosting order.
    pub fn trees(&self) -> &[GbmTree] {
        &self.trees
    }

    /// Shrinkage applied to every tree output.
    pub fn learning_rate(&self) -> f64 {
        self.learning_rate
    }

    /// Constant the ensemble starts from.
    pub fn initial_loss(&self) -> f64 {
        self.initial_loss
    }

    /// Number of features observations must have.
    pub fn feature_count(&self) -> usize {
        self.feature_count
    }
}

impl fmt::Display for RegressionGradientBoostModel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "RegressionGradientBoostModel(trees={}, learning_rate={}, initial_loss={:.4}, features={})",
            self.trees.len(),
            self.learning_rate,
            self.initial_loss,
            self.feature_count
        )
    }
}
