//! Default hyperparameters and fixed seeds.

/// Library version string.
pub const GBM_RUST_VERSION: &str = env!("CARGO_PKG_VERSION");

/// Default number of boosting stages, including the initial constant stage.
pub const DEFAULT_ITERATIONS: usize = 100;

/// Default shrinkage applied to every tree's output.
pub const DEFAULT_LEARNING_RATE: f64 = 0.1;

/// Default maximum tree depth. The root sits at depth 1.
pub const DEFAULT_MAXIMUM_TREE_DEPTH: usize = 3;

/// Default minimum number of samples on each side of a split.
pub const DEFAULT_MINIMUM_SPLIT_SIZE: usize = 1;

/// Default minimum cost improvement required to expand a split further.
pub const DEFAULT_MINIMUM_INFORMATION_GAIN: f64 = 0.000001;

/// Default fraction of in-sample rows drawn per boosting stage.
pub const DEFAULT_SUB_SAMPLE_RATIO: f64 = 1.0;

/// Default number of features searched per node (0 = all).
pub const DEFAULT_FEATURES_PER_SPLIT: usize = 0;

/// Default seed for the row subsampling RNG.
pub const DEFAULT_RANDOM_SEED: u64 = 42;

/// Seed for the per-node feature sampling RNG.
pub const FEATURE_SAMPLING_SEED: u64 = 234;

/// Default alpha for the quantile loss.
pub const DEFAULT_QUANTILE_ALPHA: f64 = 0.9;

/// Default residual percentile for the Huber transition point.
pub const DEFAULT_HUBER_ALPHA: f64 = 0.9;

/// Decision threshold on the sigmoid output for binary classification.
pub const BINARY_DECISION_THRESHOLD: f64 = 0.5;

/// Relative tolerance when comparing incrementally accumulated costs.
pub const COST_TOLERANCE: f64 = 1e-9;
