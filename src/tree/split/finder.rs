//! Presorted split search for a single feature.
//!
//! The search walks a feature's presorted sample order once. Every sample
//! starts on the right side of the candidate split; visiting a sample moves
//! it to the left side through [`GbmLoss::update_split_constants`], and a
//! boundary between two distinct feature values is scored before the move.

use super::info::SplitInfo;
use crate::core::types::{FeatureIndex, NodePosition, SampleIndex};
use crate::dataset::OrderedIndices;
use crate::loss::GbmLoss;
use ndarray::ArrayView2;

/// Candidate split of one node on one feature.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct GbmSplit {
    /// Depth of the node being split
    pub depth: usize,
    /// Feature the split tests
    pub feature_index: FeatureIndex,
    /// Position in the feature's ordered index array of the first sample
    /// routed right
    pub split_index: usize,
    /// Midpoint between the two distinct feature values around the boundary
    pub split_value: f64,
    /// Combined cost of the two sides
    pub cost: f64,
    /// Parent cost minus `cost`
    pub cost_improvement: f64,
    /// Cost of the left side
    pub left_error: f64,
    /// Cost of the right side
    pub right_error: f64,
    /// Best constant for the left side
    pub left_constant: f64,
    /// Best constant for the right side
    pub right_constant: f64,
}

/// Winning split for a feature together with both sides' statistics.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SplitResult {
    /// The split itself
    pub split: GbmSplit,
    /// Statistics of the samples routed left
    pub left: SplitInfo,
    /// Statistics of the samples routed right
    pub right: SplitInfo,
}

impl SplitResult {
    /// Orders candidates by cost, then by feature index.
    ///
    /// Using the feature index as tie-break makes node selection independent
    /// of the order in which worker threads report their results.
    pub fn is_better_than(&self, other: &SplitResult) -> bool {
        match self.split.cost.total_cmp(&other.split.cost) {
            std::cmp::Ordering::Less => true,
            std::cmp::Ordering::Greater => false,
            std::cmp::Ordering::Equal => self.split.feature_index < other.split.feature_index,
        }
    }
}

/// Read-only inputs shared by every split search of a tree.
///
/// All fields are borrowed immutably, so one instance is shared across the
/// worker threads searching different features of the same node.
#[derive(Debug, Clone, Copy)]
pub struct SplitSearch<'a> {
    loss: &'a dyn GbmLoss,
    observations: ArrayView2<'a, f64>,
    targets: &'a [f64],
    residuals: &'a [f64],
    ordered: &'a OrderedIndices,
    minimum_split_size: usize,
}

impl<'a> SplitSearch<'a> {
    /// Bundles the inputs of a split search.
    pub fn new(
        loss: &'a dyn GbmLoss,
        observations: ArrayView2<'a, f64>,
        targets: &'a [f64],
        residuals: &'a [f64],
        ordered: &'a OrderedIndices,
        minimum_split_size: usize,
    ) -> Self {
        SplitSearch {
            loss,
            observations,
            targets,
            residuals,
            ordered,
            minimum_split_size,
        }
    }

    /// Best split of the samples in `in_sample` on `feature`, or `None` when
    /// no boundary between distinct values leaves at least
    /// `minimum_split_size` samples on both sides.
    pub fn find_best_split(
        &self,
        parent: &SplitInfo,
        in_sample: &[bool],
        feature: FeatureIndex,
        depth: usize,
    ) -> Option<SplitResult> {
        let order = self.ordered.feature(feature);
        if order.len() <= 1 {
            return None;
        }

        let mut j = next_allowed_index(0, order, in_sample)?;
        let mut left = SplitInfo::new_empty().at(NodePosition::Left);
        let mut right = parent.at(NodePosition::Right);

        let mut current = order[j];
        self.move_left(&mut left, &mut right, current);
        let mut previous_value = self.observations[[current, feature]];

        let mut best: Option<SplitResult> = None;
        let mut best_cost = f64::MAX;

        while right.samples > 0 {
            j = match next_allowed_index(j + 1, order, in_sample) {
                Some(next) => next,
                None => break,
            };
            current = order[j];
            let current_value = self.observations[[current, feature]];

            if left.samples.min(right.samples) >= self.minimum_split_size
                && previous_value != current_value
            {
                let cost = left.cost + right.cost;
                if cost < best_cost {
                    best_cost = cost;
                    best = Some(SplitResult {
                        split: GbmSplit {
                            depth,
                            feature_index: feature,
                            split_index: j,
                            split_value: (previous_value + current_value) * 0.5,
                            cost,
                            cost_improvement: parent.cost - cost,
                            left_error: left.cost,
                            right_error: right.cost,
                            left_constant: left.best_constant,
                            right_constant: right.best_constant,
                        },
                        left,
                        right,
                    });
                }
            }

            self.move_left(&mut left, &mut right, current);
            previous_value = current_value;
        }

        best
    }

    /// Partitions `in_sample` at `split` into the left and right child masks.
    pub fn partition(&self, split: &GbmSplit, in_sample: &[bool]) -> (Vec<bool>, Vec<bool>) {
        let order = self.ordered.feature(split.feature_index);
        let mut left = vec![false; in_sample.len()];
        let mut right = vec![false; in_sample.len()];

        for (position, &sample) in order.iter().enumerate() {
            if position < split.split_index {
                left[sample] = in_sample[sample];
            } else {
                right[sample] = in_sample[sample];
            }
        }

        (left, right)
    }

    #[inline]
    fn move_left(&self, left: &mut SplitInfo, right: &mut SplitInfo, sample: SampleIndex) {
        self.loss
            .update_split_constants(left, right, self.targets[sample], self.residuals[sample]);
    }
}

/// First position at or after `start` whose sample is in the mask.
#[inline]
pub fn next_allowed_index(start: usize, order: &[SampleIndex], in_sample: &[bool]) -> Option<usize> {
    order
        .iter()
        .skip(start)
        .position(|&sample| in_sample[sample])
        .map(|offset| start + offset)
}
