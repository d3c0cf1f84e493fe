//! Fitted gradient boosting models.
//!
//! Models are plain data: trees, learning rate and initial constants. They
//! are immutable once built and safe to share between threads for
//! prediction. Serialization goes through serde.

pub mod classification;
pub mod regression;

pub use classification::{ClassificationGradientBoostModel, ProbabilityPrediction};
pub use regression::RegressionGradientBoostModel;

use crate::core::error::{GbmError, Result};
use crate::tree::GbmTree;
use ndarray::ArrayView1;
use std::collections::HashMap;

/// Checks that an observation has one value per training feature.
pub(crate) fn check_feature_count(observation: &ArrayView1<'_, f64>, feature_count: usize) -> Result<()> {
    if observation.len() != feature_count {
        return Err(GbmError::dimension_mismatch(
            format!("{} features", feature_count),
            format!("{} features", observation.len()),
        ));
    }
    Ok(())
}

/// `initial + learning_rate * tree(x)` summed over `trees` in order.
pub(crate) fn raw_score(
    trees: &[GbmTree],
    learning_rate: f64,
    initial_loss: f64,
    observation: &ArrayView1<'_, f64>,
) -> Result<f64> {
    trees.iter().try_fold(initial_loss, |score, tree| {
        Ok(score + learning_rate * tree.predict(observation)?)
    })
}

/// Sums every tree's split improvements per feature.
pub(crate) fn raw_variable_importance<'a, I>(trees: I, feature_count: usize) -> Result<Vec<f64>>
where
    I: IntoIterator<Item = &'a GbmTree>,
{
    let mut importance = vec![0.0; feature_count];
    for tree in trees {
        tree.add_raw_variable_importance(&mut importance)?;
    }
    Ok(importance)
}

/// Scales raw importances to 0..100 of the largest one and pairs them with
/// feature names, most important first.
pub(crate) fn scaled_variable_importance(
    raw: &[f64],
    feature_name_to_index: &HashMap<String, usize>,
) -> Result<Vec<(String, f64)>> {
    let max = raw.iter().copied().fold(0.0, f64::max);

    let mut scaled = feature_name_to_index
        .iter()
        .map(|(name, &index)| {
            let value = raw
                .get(index)
                .ok_or_else(|| GbmError::index_out_of_bounds(index, raw.len()))?;
            let value = if max > 0.0 { value / max * 100.0 } else { 0.0 };
            Ok((name.clone(), value))
        })
        .collect::<Result<Vec<_>>>()?;

    scaled.sort_by(|a, b| b.1.total_cmp(&a.1).then_with(|| a.0.cmp(&b.0)));
    Ok(scaled)
}
