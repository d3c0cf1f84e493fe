//! # gbm-rust
//!
//! Gradient boosted regression trees for regression and one-vs-all
//! classification on dense `f64` feature matrices.
//!
//! Every boosting stage fits a regression tree to the pseudo-residuals of a
//! differentiable loss, refines the tree's leaf values for that loss and adds
//! the shrunken tree output to the running predictions. Split search runs one
//! feature per task on a fixed-size worker pool and always picks the same
//! split no matter how the work is scheduled, so a fixed configuration and
//! seed reproduce the same model.
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use gbm_rust::{GradientBoostConfigBuilder, RegressionGradientBoostLearner};
//! use ndarray::Array2;
//!
//! fn main() -> gbm_rust::Result<()> {
//!     gbm_rust::init()?;
//!
//!     let observations = Array2::from_shape_fn((100, 3), |(i, j)| ((i * (j + 1)) % 13) as f64);
//!     let targets: Vec<f64> = observations
//!         .rows()
//!         .into_iter()
//!         .map(|row| row[0] * 2.0 - row[2])
//!         .collect();
//!
//!     let config = GradientBoostConfigBuilder::new()
//!         .iterations(100)
//!         .learning_rate(0.1)
//!         .maximum_tree_depth(3)
//!         .build()?;
//!
//!     let learner = RegressionGradientBoostLearner::new(config)?;
//!     let model = learner.learn(observations.view(), &targets)?;
//!     let predictions = model.predict_batch(observations.view())?;
//!     println!("first prediction: {}", predictions[0]);
//!     Ok(())
//! }
//! ```
//!
//! ## Losses
//!
//! - [`SquaredLoss`]: least squares, leaf values are residual means
//! - [`AbsoluteLoss`]: least absolute deviation, leaf values are residual medians
//! - [`QuantileLoss`]: pinball loss for a chosen quantile
//! - [`HuberLoss`]: squared error near the fit, absolute error for outliers
//! - [`BinomialLoss`]: binomial deviance, used by the classification learner
//!
//! ## Module Organization
//!
//! - [`core`]: error type, constants, worker pool and numeric helpers
//! - [`config`]: serializable training configuration and its builder
//! - [`dataset`]: presorted feature orders and input validation
//! - [`loss`]: the [`GbmLoss`] trait and its implementations
//! - [`tree`]: split search and single-tree growth
//! - [`boosting`]: the staged boosting learners and early stopping
//! - [`model`]: fitted models, prediction and variable importance

#![doc(html_root_url = "https://docs.rs/gbm-rust/")]
#![cfg_attr(docsrs, feature(doc_cfg))]
#![warn(missing_docs)]
#![deny(unsafe_op_in_unsafe_fn)]
#![warn(
    missing_debug_implementations,
    rust_2018_idioms,
    unreachable_pub,
    non_snake_case,
    non_upper_case_globals
)]

pub mod core;

pub mod config;

pub mod dataset;

pub mod loss;

pub mod tree;

pub mod boosting;

pub mod model;

pub use crate::core::error::{GbmError, Result};
pub use crate::core::utils::RunningMedian;
pub use boosting::{ClassificationGradientBoostLearner, EarlyStopping, RegressionGradientBoostLearner};
pub use config::{GradientBoostConfig, GradientBoostConfigBuilder, LossConfig};
pub use loss::{create_loss, AbsoluteLoss, BinomialLoss, GbmLoss, HuberLoss, LossState, QuantileLoss, SquaredLoss};
pub use model::{ClassificationGradientBoostModel, ProbabilityPrediction, RegressionGradientBoostModel};
pub use tree::{GbmNode, GbmTree, GbmTreeLearner};

pub use crate::core::constants::GBM_RUST_VERSION as VERSION;

/// Initialize the library.
///
/// Installs an `env_logger` logger (filtered by `RUST_LOG`, `info` by
/// default) unless the host application already installed one. Calling it
/// is optional; training works without it, only silently.
///
/// # Examples
///
/// ```rust
/// fn main() -> gbm_rust::Result<()> {
///     gbm_rust::init()?;
///     assert!(gbm_rust::is_initialized());
///     Ok(())
/// }
/// ```
pub fn init() -> Result<()> {
    crate::core::initialize_core()
}

/// Check if the library has been initialized.
pub fn is_initialized() -> bool {
    crate::core::is_core_initialized()
}

#[cfg(test)]
mod tests {
    use super::*;
    use ndarray::array;

    #[test]
    fn test_library_initialization() {
        assert!(init().is_ok());
        assert!(is_initialized());
    }

    #[test]
    fn test_version_info() {
        assert!(!VERSION.is_empty());
    }

    #[test]
    fn test_config_builder() {
        let config = GradientBoostConfigBuilder::new()
            .learning_rate(0.05)
            .iterations(500)
            .maximum_tree_depth(6)
            .loss(LossConfig::Absolute)
            .build()
            .unwrap();

        assert_eq!(config.learning_rate, 0.05);
        assert_eq!(config.iterations, 500);
        assert_eq!(config.maximum_tree_depth, 6);
        assert_eq!(config.loss, LossConfig::Absolute);
        assert_eq!(config.num_trees(), 499);
    }

    #[test]
    fn test_error_integration() {
        let err = GbmError::config("test error");
        assert_eq!(err.category(), "config");
    }

    #[test]
    fn test_top_level_round_trip() {
        let observations = array![[1.0], [2.0], [3.0], [4.0]];
        let targets = [1.0, 1.0, 5.0, 5.0];
        let config = GradientBoostConfigBuilder::new()
            .iterations(10)
            .learning_rate(0.5)
            .num_threads(1)
            .build()
            .unwrap();
        let model = RegressionGradientBoostLearner::new(config)
            .unwrap()
            .learn(observations.view(), &targets)
            .unwrap();
        assert_eq!(model.trees().len(), 9);
        assert!(model.predict(&array![4.0].view()).unwrap() > model.predict(&array![1.0].view()).unwrap());
    }
}
