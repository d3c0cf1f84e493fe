//! Regression tree produced by the growth engine.
//!
//! Nodes live in a flat vector with the root at index 0. The tree is built
//! once by [`GbmTreeLearner`](super::GbmTreeLearner) and is read-only
//! afterward.

use crate::core::error::{GbmError, Result};
use crate::core::types::{FeatureIndex, NodeIndex};
use crate::tree::node::GbmNode;
use ndarray::{Array1, ArrayView1, ArrayView2, Axis};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Binary regression tree over a flat node arena.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GbmTree {
    /// Tree nodes (index 0 is the root)
    nodes: Vec<GbmNode>,
}

impl GbmTree {
    /// Wraps a node array. Use [`GbmTree::validate`] to check its structure.
    pub fn new(nodes: Vec<GbmNode>) -> Self {
        GbmTree { nodes }
    }

    /// Returns all nodes in index order.
    pub fn nodes(&self) -> &[GbmNode] {
        &self.nodes
    }

    /// Returns the node at `index`.
    pub fn node(&self, index: NodeIndex) -> Option<&GbmNode> {
        self.nodes.get(index)
    }

    /// Returns the number of nodes.
    pub fn num_nodes(&self) -> usize {
        self.nodes.len()
    }

    /// Returns the number of leaves.
    pub fn num_leaves(&self) -> usize {
        self.nodes.iter().filter(|node| node.is_leaf()).count()
    }

    /// Returns the depth of the deepest node.
    pub fn depth(&self) -> usize {
        self.nodes.iter().map(GbmNode::depth).max().unwrap_or(0)
    }

    /// Predicts a single observation by walking from the root.
    pub fn predict(&self, observation: &ArrayView1<'_, f64>) -> Result<f64> {
        let mut index = 0;

        loop {
            let node = self
                .nodes
                .get(index)
                .ok_or_else(|| GbmError::prediction(format!("tree has no node {}", index)))?;

            let feature = match node.feature_index() {
                None => return Ok(node.left_constant()),
                Some(feature) => feature,
            };

            let value = *observation
                .get(feature)
                .ok_or_else(|| GbmError::index_out_of_bounds(feature, observation.len()))?;

            let (child, constant) = if value < node.split_value() {
                (node.left_index(), node.left_constant())
            } else {
                (node.right_index(), node.right_constant())
            };

            match child {
                Some(child) => index = child,
                None => return Ok(constant),
            }
        }
    }

    /// Predicts every row of `observations` into `predictions`.
    ///
    /// Reusing the output buffer avoids an allocation per tree when the
    /// booster updates its running predictions.
    pub fn predict_into(&self, observations: ArrayView2<'_, f64>, predictions: &mut [f64]) -> Result<()> {
        if predictions.len() != observations.nrows() {
            return Err(GbmError::dimension_mismatch(
                format!("{} predictions", observations.nrows()),
                format!("{} predictions", predictions.len()),
            ));
        }

        for (row, prediction) in observations.axis_iter(Axis(0)).zip(predictions.iter_mut()) {
            *prediction = self.predict(&row)?;
        }

        Ok(())
    }

    /// Predicts every row of `observations`.
    pub fn predict_batch(&self, observations: ArrayView2<'_, f64>) -> Result<Array1<f64>> {
        let mut predictions = Array1::zeros(observations.nrows());
        match predictions.as_slice_mut() {
            Some(slice) => self.predict_into(observations, slice)?,
            None => return Err(GbmError::internal("prediction buffer is not contiguous")),
        }
        Ok(predictions)
    }

    /// Adds each split's cost improvement to the entry of its feature.
    pub fn add_raw_variable_importance(&self, importance: &mut [f64]) -> Result<()> {
        let length = importance.len();
        for node in &self.nodes {
            if let Some(feature) = node.feature_index() {
                let slot = importance
                    .get_mut(feature)
                    .ok_or_else(|| GbmError::index_out_of_bounds(feature, length))?;
                *slot += node.cost_improvement();
            }
        }
        Ok(())
    }

    /// Features used by at least one split, ascending.
    pub fn split_features(&self) -> Vec<FeatureIndex> {
        let mut features: Vec<_> = self.nodes.iter().filter_map(GbmNode::feature_index).collect();
        features.sort_unstable();
        features.dedup();
        features
    }

    /// Checks the node arena: leaves have no children, splits have both
    /// children, children come after their parent and every non-root node
    /// has exactly one parent.
    pub fn validate(&self) -> Result<()> {
        if self.nodes.is_empty() {
            return Err(GbmError::tree_construction("tree has no nodes"));
        }

        let mut parents = vec![0usize; self.nodes.len()];

        for (index, node) in self.nodes.iter().enumerate() {
            match (node.is_leaf(), node.left_index(), node.right_index()) {
                (true, None, None) => {}
                (true, _, _) => {
                    return Err(GbmError::tree_construction(format!(
                        "leaf node {} has children",
                        index
                    )))
                }
                (false, Some(left), Some(right)) => {
                    for child in [left, right] {
                        if child <= index || child >= self.nodes.len() {
                            return Err(GbmError::tree_construction(format!(
                                "node {} has invalid child index {}",
                                index, child
                            )));
                        }
                        parents[child] += 1;
                    }
                }
                (false, _, _) => {
                    return Err(GbmError::tree_construction(format!(
                        "split node {} is missing a child",
                        index
                    )))
                }
            }
        }

        if parents[0] != 0 {
            return Err(GbmError::tree_construction("root node has a parent"));
        }

        if let Some(orphan) = parents.iter().skip(1).position(|&count| count != 1) {
            return Err(GbmError::tree_construction(format!(
                "node {} is referenced by {} parents",
                orphan + 1,
                parents[orphan + 1]
            )));
        }

        Ok(())
    }

    /// Returns a textual representation of the tree structure.
    pub fn to_string_representation(&self) -> String {
        if self.nodes.is_empty() {
            return "Empty tree".to_string();
        }

        let mut result = String::new();
        self.tree_to_string_recursive(0, "", true, &mut result);
        result
    }

    fn tree_to_string_recursive(&self, index: NodeIndex, prefix: &str, is_last: bool, result: &mut String) {
        let node = match self.nodes.get(index) {
            Some(node) => node,
            None => return,
        };

        let branch = if is_last { "└── " } else { "├── " };
        result.push_str(&format!("{}{}{}\n", prefix, branch, node));

        let child_prefix = format!("{}{}", prefix, if is_last { "    " } else { "│   " });
        if let Some(left) = node.left_index() {
            self.tree_to_string_recursive(left, &child_prefix, false, result);
        }
        if let Some(right) = node.right_index() {
            self.tree_to_string_recursive(right, &child_prefix, true, result);
        }
    }
}

impl fmt::Display for GbmTree {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "GbmTree(nodes={}, leaves={}, depth={})",
            self.num_nodes(),
            self.num_leaves(),
            self.depth()
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::types::NodePosition;
    use ndarray::array;

    /// x0 < 2.5 ? (x1 < 0.5 ? -2 : -1) : 3
    fn sample_tree() -> GbmTree {
        let mut root = GbmNode::new_split(0, 2.5, -1.5, 3.0, 1, 4.0, 6);
        root.set_child(NodePosition::Left, 1);
        root.set_child(NodePosition::Right, 2);
        let mut inner = GbmNode::new_split(1, 0.5, -2.0, -1.0, 2, 1.0, 4);
        inner.set_child(NodePosition::Left, 3);
        inner.set_child(NodePosition::Right, 4);

        GbmTree::new(vec![
            root,
            inner,
            GbmNode::new_leaf(3.0, 2, 2),
            GbmNode::new_leaf(-2.0, 3, 2),
            GbmNode::new_leaf(-1.0, 3, 2),
        ])
    }

    #[test]
    fn test_predict_walks_to_leaf() {
        let tree = sample_tree();
        assert_eq!(tree.predict(&array![1.0, 0.0].view()).unwrap(), -2.0);
        assert_eq!(tree.predict(&array![1.0, 0.5].view()).unwrap(), -1.0);
        assert_eq!(tree.predict(&array![2.5, 0.0].view()).unwrap(), 3.0);
    }

    #[test]
    fn test_predict_is_deterministic() {
        let tree = sample_tree();
        let observation = array![0.3, 7.0];
        let first = tree.predict(&observation.view()).unwrap();
        for _ in 0..10 {
            assert_eq!(tree.predict(&observation.view()).unwrap().to_bits(), first.to_bits());
        }
    }

    #[test]
    fn test_single_leaf_tree() {
        let tree = GbmTree::new(vec![GbmNode::new_leaf(0.25, 1, 3)]);
        assert!(tree.validate().is_ok());
        assert_eq!(tree.predict(&array![100.0].view()).unwrap(), 0.25);
        assert_eq!(tree.num_leaves(), 1);
        assert_eq!(tree.depth(), 1);
    }

    #[test]
    fn test_predict_batch() {
        let tree = sample_tree();
        let observations = array![[0.0, 0.0], [0.0, 1.0], [5.0, 0.0]];
        let predictions = tree.predict_batch(observations.view()).unwrap();
        assert_eq!(predictions, array![-2.0, -1.0, 3.0]);

        let mut short = vec![0.0; 2];
        assert!(tree.predict_into(observations.view(), &mut short).is_err());
    }

    #[test]
    fn test_short_observation_is_rejected() {
        let tree = sample_tree();
        let err = tree.predict(&array![0.0].view()).unwrap_err();
        assert!(matches!(err, GbmError::IndexOutOfBounds { index: 1, length: 1 }));
    }

    #[test]
    fn test_raw_variable_importance() {
        let tree = sample_tree();
        let mut importance = vec![0.0; 3];
        tree.add_raw_variable_importance(&mut importance).unwrap();
        assert_eq!(importance, vec![4.0, 1.0, 0.0]);
        assert_eq!(tree.split_features(), vec![0, 1]);

        let mut too_small = vec![0.0; 1];
        assert!(matches!(
            tree.add_raw_variable_importance(&mut too_small),
            Err(GbmError::IndexOutOfBounds { index: 1, length: 1 })
        ));
    }

    #[test]
    fn test_tree_validation() {
        let tree = sample_tree();
        assert!(tree.validate().is_ok());
        assert_eq!(tree.num_nodes(), 5);
        assert_eq!(tree.num_leaves(), 3);
        assert_eq!(tree.depth(), 3);

        let mut dangling = GbmNode::new_split(0, 1.0, 0.0, 0.0, 1, 0.0, 2);
        dangling.set_child(NodePosition::Left, 1);
        let broken = GbmTree::new(vec![dangling, GbmNode::new_leaf(0.0, 2, 1)]);
        assert!(broken.validate().is_err());

        let mut backwards = GbmNode::new_split(0, 1.0, 0.0, 0.0, 2, 0.0, 2);
        backwards.set_child(NodePosition::Left, 0);
        backwards.set_child(NodePosition::Right, 2);
        let mut root = GbmNode::new_split(0, 1.0, 0.0, 0.0, 1, 0.0, 2);
        root.set_child(NodePosition::Left, 1);
        root.set_child(NodePosition::Right, 2);
        let cyclic = GbmTree::new(vec![root, backwards, GbmNode::new_leaf(0.0, 2, 1)]);
        assert!(cyclic.validate().is_err());

        assert!(GbmTree::new(Vec::new()).validate().is_err());
    }

    #[test]
    fn test_string_representation() {
        let text = sample_tree().to_string_representation();
        assert_eq!(text.lines().count(), 5);
        assert!(text.starts_with("└── Split(feature=0"));
        assert_eq!(sample_tree().to_string(), "GbmTree(nodes=5, leaves=3, depth=3)");
    }

    #[test]
    fn test_serialization() {
        let tree = sample_tree();
        let json = serde_json::to_string(&tree).unwrap();
        let restored: GbmTree = serde_json::from_str(&json).unwrap();
        assert_eq!(restored, tree);
    }
}
