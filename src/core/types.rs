//! Core data types for the gradient boosting engine.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Feature (column) index in the observation matrix.
pub type FeatureIndex = usize;

/// Sample (row) index in the observation matrix.
pub type SampleIndex = usize;

/// Position of a node in a tree's flat node array.
pub type NodeIndex = usize;

/// Boosting stage number.
pub type IterationIndex = usize;

/// Side of its parent a tree node hangs on.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum NodePosition {
    /// The root has no parent.
    Root,
    /// Samples with `x[feature] < split_value`.
    Left,
    /// Samples with `x[feature] >= split_value`.
    Right,
}

impl Default for NodePosition {
    fn default() -> Self {
        NodePosition::Root
    }
}

impl fmt::Display for NodePosition {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            NodePosition::Root => write!(f, "root"),
            NodePosition::Left => write!(f, "left"),
            NodePosition::Right => write!(f, "right"),
        }
    }
}
