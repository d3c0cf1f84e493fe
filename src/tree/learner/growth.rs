//! Breadth-first node expansion.
//!
//! Nodes are taken from a FIFO queue one at a time. Each node's split
//! search runs across features on the worker pool; the winner is chosen
//! after all workers have joined, so only the search itself is parallel.

use super::{GbmTreeLearner, TreeTrainingData};
use crate::core::error::{GbmError, Result};
use crate::core::types::{FeatureIndex, NodeIndex, NodePosition};
use crate::core::utils::{ResultBag, WorkQueue, Worker, WorkerPool};
use crate::loss::GbmLoss;
use crate::tree::node::GbmNode;
use crate::tree::sampling::FeatureSampler;
use crate::tree::split::{SplitInfo, SplitResult, SplitSearch};
use crate::tree::tree::GbmTree;
use std::collections::VecDeque;

/// Pending node waiting in the growth queue.
#[derive(Debug)]
struct TreeCreationItem {
    /// Statistics of the samples reaching the node
    stats: SplitInfo,
    /// Samples reaching the node
    in_sample: Vec<bool>,
    /// Depth of the node, the root being at depth 1
    depth: usize,
    /// Parent index and the side this node hangs on
    parent: Option<(NodeIndex, NodePosition)>,
    /// Value predicted if the node ends up a leaf
    constant: f64,
}

pub(super) fn grow(
    learner: &GbmTreeLearner,
    data: &TreeTrainingData<'_>,
    in_sample: &[bool],
    sampler: &mut FeatureSampler,
    pool: &WorkerPool,
    loss: &dyn GbmLoss,
) -> Result<GbmTree> {
    let search = SplitSearch::new(
        loss,
        data.observations.view(),
        data.targets,
        data.residuals,
        data.ordered,
        learner.minimum_split_size,
    );
    let refine = |constant: f64, mask: &[bool]| {
        if loss.update_leaf_values() {
            loss.updated_leaf_value(constant, data.targets, data.predictions, mask, &data.loss_state)
        } else {
            constant
        }
    };

    let root_stats = loss.init_split(data.targets, data.residuals, in_sample);
    let root_constant = refine(root_stats.best_constant, in_sample);

    let mut queue = VecDeque::new();
    queue.push_back(TreeCreationItem {
        stats: root_stats,
        in_sample: in_sample.to_vec(),
        depth: 1,
        parent: None,
        constant: root_constant,
    });

    let num_features = data.observations.ncols();
    let mut nodes: Vec<GbmNode> = Vec::new();

    while let Some(item) = queue.pop_front() {
        let index = nodes.len();
        let features = sampler.sample(num_features);
        let best = find_best_split(&search, &item, features, pool)?;

        let result = match best {
            Some(result) => result,
            None => {
                nodes.push(GbmNode::new_leaf(item.constant, item.depth, item.stats.samples));
                link_to_parent(&mut nodes, item.parent, index)?;
                continue;
            }
        };

        let split = result.split;
        let (left_in_sample, right_in_sample) = search.partition(&split, &item.in_sample);
        let left_constant = refine(split.left_constant, &left_in_sample);
        let right_constant = refine(split.right_constant, &right_in_sample);

        log::trace!(
            "node {} depth {}: feature {} < {:.6} improves cost by {:.6}",
            index,
            item.depth,
            split.feature_index,
            split.split_value,
            split.cost_improvement
        );

        nodes.push(GbmNode::new_split(
            split.feature_index,
            split.split_value,
            left_constant,
            right_constant,
            item.depth,
            split.cost_improvement,
            item.stats.samples,
        ));
        link_to_parent(&mut nodes, item.parent, index)?;

        let child_depth = item.depth + 1;
        let terminal = item.depth >= learner.maximum_tree_depth
            || split.cost_improvement < learner.minimum_information_gain;

        if terminal {
            let left_index = nodes.len();
            nodes.push(GbmNode::new_leaf(left_constant, child_depth, result.left.samples));
            link_to_parent(&mut nodes, Some((index, NodePosition::Left)), left_index)?;

            let right_index = nodes.len();
            nodes.push(GbmNode::new_leaf(right_constant, child_depth, result.right.samples));
            link_to_parent(&mut nodes, Some((index, NodePosition::Right)), right_index)?;
        } else {
            queue.push_back(TreeCreationItem {
                stats: result.left,
                in_sample: left_in_sample,
                depth: child_depth,
                parent: Some((index, NodePosition::Left)),
                constant: left_constant,
            });
            queue.push_back(TreeCreationItem {
                stats: result.right,
                in_sample: right_in_sample,
                depth: child_depth,
                parent: Some((index, NodePosition::Right)),
                constant: right_constant,
            });
        }
    }

    Ok(GbmTree::new(nodes))
}

/// Runs the split search of every feature in `features` on the pool and
/// returns the lowest-cost candidate.
fn find_best_split(
    search: &SplitSearch<'_>,
    item: &TreeCreationItem,
    features: Vec<FeatureIndex>,
    pool: &WorkerPool,
) -> Result<Option<SplitResult>> {
    let num_workers = pool.num_threads().min(features.len()).max(1);
    let queue = WorkQueue::new(features);
    let results = ResultBag::new();

    let workers: Vec<Worker<'_>> = (0..num_workers)
        .map(|_| {
            let queue = &queue;
            let results = &results;
            Box::new(move || {
                while let Some(feature) = queue.pop() {
                    if let Some(candidate) =
                        search.find_best_split(&item.stats, &item.in_sample, feature, item.depth)
                    {
                        results.push(candidate);
                    }
                }
            }) as Worker<'_>
        })
        .collect();

    pool.run(workers)?;

    Ok(results
        .into_vec()
        .into_iter()
        .fold(None, |best: Option<SplitResult>, candidate| match best {
            Some(best) if !candidate.is_better_than(&best) => Some(best),
            _ => Some(candidate),
        }))
}

fn link_to_parent(
    nodes: &mut [GbmNode],
    parent: Option<(NodeIndex, NodePosition)>,
    child: NodeIndex,
) -> Result<()> {
    if let Some((parent, position)) = parent {
        let length = nodes.len();
        nodes
            .get_mut(parent)
            .ok_or_else(|| GbmError::tree_construction(format!(
                "parent {} of node {} is outside the {} emitted nodes",
                parent, child, length
            )))?
            .set_child(position, child);
    }
    Ok(())
}
