//! Tree node stored in the flat node arena of a [`GbmTree`](super::GbmTree).
//!
//! A node is either a leaf (no split feature, no children) or a split with
//! both children set. Children always live at larger indices than their
//! parent.

use crate::core::types::{FeatureIndex, NodeIndex, NodePosition};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Node of a gradient boosting regression tree.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct GbmNode {
    /// Split feature (None for leaves)
    feature_index: Option<FeatureIndex>,
    /// Samples with `x[feature] < split_value` go left
    split_value: f64,
    /// Constant of the left side (the leaf value for leaves)
    left_constant: f64,
    /// Constant of the right side (the leaf value for leaves)
    right_constant: f64,
    /// Left child index
    left_index: Option<NodeIndex>,
    /// Right child index
    right_index: Option<NodeIndex>,
    /// Depth of the node, the root being at depth 1
    depth: usize,
    /// Cost reduction achieved by the split (0 for leaves)
    cost_improvement: f64,
    /// In-sample count reaching the node during training
    samples: usize,
}

impl GbmNode {
    /// Creates a leaf predicting `value`.
    pub fn new_leaf(value: f64, depth: usize, samples: usize) -> Self {
        GbmNode {
            feature_index: None,
            split_value: 0.0,
            left_constant: value,
            right_constant: value,
            left_index: None,
            right_index: None,
            depth,
            cost_improvement: 0.0,
            samples,
        }
    }

    /// Creates a split node. Children are linked later with
    /// [`GbmNode::set_child`].
    pub fn new_split(
        feature_index: FeatureIndex,
        split_value: f64,
        left_constant: f64,
        right_constant: f64,
        depth: usize,
        cost_improvement: f64,
        samples: usize,
    ) -> Self {
        GbmNode {
            feature_index: Some(feature_index),
            split_value,
            left_constant,
            right_constant,
            left_index: None,
            right_index: None,
            depth,
            cost_improvement,
            samples,
        }
    }

    /// Returns true if this node is a leaf.
    pub fn is_leaf(&self) -> bool {
        self.feature_index.is_none()
    }

    /// Returns the split feature.
    pub fn feature_index(&self) -> Option<FeatureIndex> {
        self.feature_index
    }

    /// Returns the split threshold.
    pub fn split_value(&self) -> f64 {
        self.split_value
    }

    /// Returns the left constant.
    pub fn left_constant(&self) -> f64 {
        self.left_constant
    }

    /// Returns the right constant.
    pub fn right_constant(&self) -> f64 {
        self.right_constant
    }

    /// Returns the left child index.
    pub fn left_index(&self) -> Option<NodeIndex> {
        self.left_index
    }

    /// Returns the right child index.
    pub fn right_index(&self) -> Option<NodeIndex> {
        self.right_index
    }

    /// Returns the node depth.
    pub fn depth(&self) -> usize {
        self.depth
    }

    /// Returns the cost improvement of the split.
    pub fn cost_improvement(&self) -> f64 {
        self.cost_improvement
    }

    /// Returns the number of training samples that reached this node.
    pub fn samples(&self) -> usize {
        self.samples
    }

    /// Links `child` as the left or right child of this node.
    pub fn set_child(&mut self, position: NodePosition, child: NodeIndex) {
        match position {
            NodePosition::Left => self.left_index = Some(child),
            NodePosition::Right => self.right_index = Some(child),
            NodePosition::Root => {}
        }
    }
}

impl fmt::Display for GbmNode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.feature_index {
            None => write!(
                f,
                "Leaf(value={:.4}, samples={})",
                self.left_constant, self.samples
            ),
            Some(feature) => write!(
                f,
                "Split(feature={}, value={:.4}, left={:.4}, right={:.4}, improvement={:.4})",
                feature, self.split_value, self.left_constant, self.right_constant, self.cost_improvement
            ),
        }
    }
}
