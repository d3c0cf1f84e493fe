//! Training data checks and the presorted per-feature index table.
//!
//! Observations are dense `f64` matrices with one row per sample and one
//! column per feature. Before any tree is grown, every column is sorted once
//! into an [`OrderedIndices`] table which the split search walks for every
//! node of every tree.

use crate::core::error::{GbmError, Result};
use crate::core::types::{FeatureIndex, SampleIndex};
use ndarray::{ArrayView2, Axis};
use rayon::prelude::*;

/// Per-feature permutations of the sample indices, ascending by feature value.
///
/// For every feature `f`, `feature(f)` is a permutation of `0..num_samples`
/// and `observations[[feature(f)[i], f]]` is non-decreasing in `i`. Equal
/// values keep their row order.
#[derive(Debug, Clone, PartialEq)]
pub struct OrderedIndices {
    per_feature: Vec<Vec<SampleIndex>>,
    num_samples: usize,
}

impl OrderedIndices {
    /// Sorts every column of `observations`. Columns are sorted in parallel.
    pub fn new(observations: ArrayView2<'_, f64>) -> Self {
        let num_samples = observations.nrows();
        let per_feature = (0..observations.ncols())
            .into_par_iter()
            .map(|feature| {
                let column = observations.index_axis(Axis(1), feature);
                let mut indices: Vec<SampleIndex> = (0..num_samples).collect();
                indices.sort_by(|&a, &b| column[a].total_cmp(&column[b]));
                indices
            })
            .collect();

        OrderedIndices {
            per_feature,
            num_samples,
        }
    }

    /// Sample indices sorted by the value of `feature`.
    pub fn feature(&self, feature: FeatureIndex) -> &[SampleIndex] {
        &self.per_feature[feature]
    }

    /// Number of features (columns).
    pub fn num_features(&self) -> usize {
        self.per_feature.len()
    }

    /// Number of samples (rows).
    pub fn num_samples(&self) -> usize {
        self.num_samples
    }
}

/// Checks that the observation matrix is non-empty, finite and matches the
/// targets.
pub fn verify_observations_and_targets(
    observations: &ArrayView2<'_, f64>,
    targets: &[f64],
) -> Result<()> {
    if observations.nrows() == 0 || observations.ncols() == 0 {
        return Err(GbmError::invalid_parameter(
            "observations",
            format!("{}x{}", observations.nrows(), observations.ncols()),
            "must have at least one row and one column",
        ));
    }

    if observations.nrows() != targets.len() {
        return Err(GbmError::dimension_mismatch(
            format!("{} targets (one per observation row)", observations.nrows()),
            format!("{} targets", targets.len()),
        ));
    }

    // Split thresholds are midpoints between distinct sorted values, which
    // NaN and infinities would poison.
    if let Some(((row, column), value)) = observations.indexed_iter().find(|(_, value)| !value.is_finite()) {
        return Err(GbmError::invalid_parameter(
            "observations",
            format!("{} at row {}, column {}", value, row, column),
            "must be finite",
        ));
    }

    if let Some((row, value)) = targets.iter().enumerate().find(|(_, value)| !value.is_finite()) {
        return Err(GbmError::invalid_parameter(
            "targets",
            format!("{} at row {}", value, row),
            "must be finite",
        ));
    }

    Ok(())
}

/// Checks that `indices` is non-empty and addresses existing rows.
pub fn verify_indices(indices: &[SampleIndex], num_samples: usize) -> Result<()> {
    if indices.is_empty() {
        return Err(GbmError::invalid_parameter(
            "indices",
            "[]",
            "must contain at least one sample index",
        ));
    }

    match indices.iter().find(|&&index| index >= num_samples) {
        Some(&index) => Err(GbmError::index_out_of_bounds(index, num_samples)),
        None => Ok(()),
    }
}

/// Boolean membership mask of length `num_samples` for `indices`.
pub fn in_sample_mask(indices: &[SampleIndex], num_samples: usize) -> Vec<bool> {
    let mut mask = vec![false; num_samples];
    for &index in indices {
        mask[index] = true;
    }
    mask
}
