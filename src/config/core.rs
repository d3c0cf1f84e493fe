//! Hyperparameters for the gradient boosting learners.
//!
//! [`GradientBoostConfig`] is plain serializable data with defaults for every
//! field, so a TOML or JSON file only has to name what it changes. The
//! [`GradientBoostConfigBuilder`] offers the same settings fluently and
//! validates on `build()`.

use super::loss::LossConfig;
use crate::core::constants::*;
use crate::core::error::{GbmError, Result};

use serde::{Deserialize, Serialize};
use std::path::Path;

/// Configuration shared by the regression and classification learners.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct GradientBoostConfig {
    /// Number of boosting stages. The first stage is the constant model, so
    /// `iterations - 1` trees are fitted.
    pub iterations: usize,
    /// Shrinkage applied to every tree's output
    pub learning_rate: f64,
    /// Maximum tree depth (the root is at depth 1)
    pub maximum_tree_depth: usize,
    /// Minimum number of samples on each side of a split
    pub minimum_split_size: usize,
    /// Minimum cost improvement needed before a split's children are expanded
    pub minimum_information_gain: f64,
    /// Fraction of the in-sample rows drawn without replacement per stage
    pub sub_sample_ratio: f64,
    /// Features searched per node; 0 searches all of them
    pub features_per_split: usize,
    /// Worker threads used for the per-feature split search
    pub num_threads: usize,
    /// Seed for the row subsampling RNG
    pub seed: u64,
    /// Loss to minimize
    pub loss: LossConfig,
}

impl Default for GradientBoostConfig {
    fn default() -> Self {
        GradientBoostConfig {
            iterations: DEFAULT_ITERATIONS,
            learning_rate: DEFAULT_LEARNING_RATE,
            maximum_tree_depth: DEFAULT_MAXIMUM_TREE_DEPTH,
            minimum_split_size: DEFAULT_MINIMUM_SPLIT_SIZE,
            minimum_information_gain: DEFAULT_MINIMUM_INFORMATION_GAIN,
            sub_sample_ratio: DEFAULT_SUB_SAMPLE_RATIO,
            features_per_split: DEFAULT_FEATURES_PER_SPLIT,
            num_threads: num_cpus::get(),
            seed: DEFAULT_RANDOM_SEED,
            loss: LossConfig::default(),
        }
    }
}

impl GradientBoostConfig {
    /// Create a new configuration with default values
    pub fn new() -> Self {
        Self::default()
    }

    /// Validate the configuration parameters
    pub fn validate(&self) -> Result<()> {
        if self.iterations < 1 {
            return Err(GbmError::invalid_parameter(
                "iterations",
                self.iterations.to_string(),
                "must be at least 1",
            ));
        }

        if !(self.learning_rate > 0.0) {
            return Err(GbmError::invalid_parameter(
                "learning_rate",
                self.learning_rate.to_string(),
                "must be larger than 0.0",
            ));
        }

        if self.maximum_tree_depth < 1 {
            return Err(GbmError::invalid_parameter(
                "maximum_tree_depth",
                self.maximum_tree_depth.to_string(),
                "must be at least 1",
            ));
        }

        if self.minimum_split_size < 1 {
            return Err(GbmError::invalid_parameter(
                "minimum_split_size",
                self.minimum_split_size.to_string(),
                "must be at least 1",
            ));
        }

        if !(self.minimum_information_gain > 0.0) {
            return Err(GbmError::invalid_parameter(
                "minimum_information_gain",
                self.minimum_information_gain.to_string(),
                "must be larger than 0.0",
            ));
        }

        if !(self.sub_sample_ratio > 0.0 && self.sub_sample_ratio <= 1.0) {
            return Err(GbmError::invalid_parameter(
                "sub_sample_ratio",
                self.sub_sample_ratio.to_string(),
                "must be in range (0.0, 1.0]",
            ));
        }

        if self.num_threads < 1 {
            return Err(GbmError::invalid_parameter(
                "num_threads",
                self.num_threads.to_string(),
                "must be at least 1",
            ));
        } else if self.num_threads > num_cpus::get() * 2 {
            log::warn!(
                "num_threads ({}) is much larger than available cores ({})",
                self.num_threads,
                num_cpus::get()
            );
        }

        self.loss.validate()
    }

    /// Number of trees a model trained with this configuration holds per series.
    pub fn num_trees(&self) -> usize {
        self.iterations.saturating_sub(1)
    }

    /// Thread count actually handed to the worker pool.
    pub fn effective_num_threads(&self) -> usize {
        self.num_threads.max(1)
    }

    /// True when each stage trains on a random subset of rows.
    pub fn is_subsampling(&self) -> bool {
        self.sub_sample_ratio < 1.0
    }

    /// Load configuration from a `.toml` or `.json` file
    pub fn load_from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path)
            .map_err(|e| GbmError::config(format!("Failed to read config file: {}", e)))?;

        let config: GradientBoostConfig = match path.extension().and_then(|s| s.to_str()) {
            Some("json") => serde_json::from_str(&content)
                .map_err(|e| GbmError::config(format!("Failed to parse JSON config: {}", e)))?,
            Some("toml") => toml::from_str(&content)
                .map_err(|e| GbmError::config(format!("Failed to parse TOML config: {}", e)))?,
            _ => {
                return Err(GbmError::config(
                    "Unsupported config file format. Use .json or .toml",
                ))
            }
        };

        config.validate()?;
        log::debug!("Loaded configuration from {}", path.display());
        Ok(config)
    }

    /// Save configuration to a `.toml` or `.json` file
    pub fn save_to_file<P: AsRef<Path>>(&self, path: P) -> Result<()> {
        let path = path.as_ref();
        let content = match path.extension().and_then(|s| s.to_str()) {
            Some("json") => serde_json::to_string_pretty(self)
                .map_err(|e| GbmError::config(format!("Failed to serialize to JSON: {}", e)))?,
            Some("toml") => toml::to_string_pretty(self)
                .map_err(|e| GbmError::config(format!("Failed to serialize to TOML: {}", e)))?,
            _ => {
                return Err(GbmError::config(
                    "Unsupported config file format. Use .json or .toml",
                ))
            }
        };

        std::fs::write(path, content)
            .map_err(|e| GbmError::config(format!("Failed to write config file: {}", e)))?;

        Ok(())
    }

    /// Overrides fields from `GBM_*` environment variables, then validates.
    ///
    /// Recognized: `GBM_ITERATIONS`, `GBM_LEARNING_RATE`, `GBM_MAXIMUM_TREE_DEPTH`,
    /// `GBM_NUM_THREADS`, `GBM_SEED`.
    pub fn apply_environment_overrides(&mut self) -> Result<()> {
        fn read<T: std::str::FromStr>(name: &str) -> Result<Option<T>> {
            match std::env::var(name) {
                Ok(value) => value
                    .trim()
                    .parse()
                    .map(Some)
                    .map_err(|_| GbmError::config(format!("Invalid {}: {}", name, value))),
                Err(_) => Ok(None),
            }
        }

        if let Some(value) = read("GBM_ITERATIONS")? {
            self.iterations = value;
        }
        if let Some(value) = read("GBM_LEARNING_RATE")? {
            self.learning_rate = value;
        }
        if let Some(value) = read("GBM_MAXIMUM_TREE_DEPTH")? {
            self.maximum_tree_depth = value;
        }
        if let Some(value) = read("GBM_NUM_THREADS")? {
            self.num_threads = value;
        }
        if let Some(value) = read("GBM_SEED")? {
            self.seed = value;
        }

        self.validate()
    }
}

/// Builder for [`GradientBoostConfig`]
#[derive(Debug, Clone)]
pub struct GradientBoostConfigBuilder {
    config: GradientBoostConfig,
}

impl GradientBoostConfigBuilder {
    /// Create a new configuration builder
    pub fn new() -> Self {
        GradientBoostConfigBuilder {
            config: GradientBoostConfig::default(),
        }
    }

    /// Set the number of boosting stages
    pub fn iterations(mut self, iterations: usize) -> Self {
        self.config.iterations = iterations;
        self
    }

    /// Set the learning rate
    pub fn learning_rate(mut self, rate: f64) -> Self {
        self.config.learning_rate = rate;
        self
    }

    /// Set the maximum tree depth
    pub fn maximum_tree_depth(mut self, depth: usize) -> Self {
        self.config.maximum_tree_depth = depth;
        self
    }

    /// Set the minimum number of samples per split side
    pub fn minimum_split_size(mut self, size: usize) -> Self {
        self.config.minimum_split_size = size;
        self
    }

    /// Set the minimum cost improvement for expanding a split
    pub fn minimum_information_gain(mut self, gain: f64) -> Self {
        self.config.minimum_information_gain = gain;
        self
    }

    /// Set the row subsampling ratio
    pub fn sub_sample_ratio(mut self, ratio: f64) -> Self {
        self.config.sub_sample_ratio = ratio;
        self
    }

    /// Set the number of features searched per node
    pub fn features_per_split(mut self, features: usize) -> Self {
        self.config.features_per_split = features;
        self
    }

    /// Set the worker thread count
    pub fn num_threads(mut self, threads: usize) -> Self {
        self.config.num_threads = threads;
        self
    }

    /// Set the subsampling seed
    pub fn seed(mut self, seed: u64) -> Self {
        self.config.seed = seed;
        self
    }

    /// Set the loss
    pub fn loss(mut self, loss: LossConfig) -> Self {
        self.config.loss = loss;
        self
    }

    /// Build the configuration
    pub fn build(self) -> Result<GradientBoostConfig> {
        self.config.validate()?;
        Ok(self.config)
    }
}

impl Default for GradientBoostConfigBuilder {
    fn default() -> Self {
        Self::new()
    }
}
