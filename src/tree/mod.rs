//! Regression trees: split search, node expansion and the fitted tree.
//!
//! The boosting loop hands each iteration's residuals to a
//! [`GbmTreeLearner`], which grows a [`GbmTree`] by presorted split search
//! over the features picked by a [`FeatureSampler`].

pub mod learner;
pub mod node;
pub mod sampling;
pub mod split;
pub mod tree;

pub use learner::{GbmTreeLearner, TreeTrainingData};
pub use node::GbmNode;
pub use sampling::FeatureSampler;
pub use split::{GbmSplit, SplitInfo, SplitResult, SplitSearch};
pub use tree::GbmTree;
