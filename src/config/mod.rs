//! Configuration for the boosting learners.
//!
//! Configurations are plain serde data: they can be built in code through
//! [`GradientBoostConfigBuilder`], loaded from `.toml`/`.json` files, or
//! adjusted from `GBM_*` environment variables. Every entry point validates
//! before a learner is constructed.

pub mod core;
pub mod loss;

pub use self::core::{GradientBoostConfig, GradientBoostConfigBuilder};
pub use self::loss::LossConfig;
