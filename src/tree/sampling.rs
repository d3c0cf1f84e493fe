//! Random feature subsets for per-node split search.

use crate::core::types::FeatureIndex;
use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use rand::SeedableRng;

/// Draws the features searched at each node.
///
/// With `features_per_split == 0`, or a value at or above the feature
/// count, every feature is searched. Otherwise each call shuffles all
/// feature indices and keeps the first `features_per_split`, returned in
/// ascending order.
#[derive(Debug, Clone)]
pub struct FeatureSampler {
    features_per_split: usize,
    rng: StdRng,
}

impl FeatureSampler {
    /// Creates a sampler with its own seeded random stream.
    pub fn new(features_per_split: usize, seed: u64) -> Self {
        FeatureSampler {
            features_per_split,
            rng: StdRng::seed_from_u64(seed),
        }
    }

    /// Returns the configured subset size (0 means all features).
    pub fn features_per_split(&self) -> usize {
        self.features_per_split
    }

    /// True when every call returns all features.
    pub fn is_exhaustive(&self, num_features: usize) -> bool {
        self.features_per_split == 0 || self.features_per_split >= num_features
    }

    /// Features to search for the next node.
    pub fn sample(&mut self, num_features: usize) -> Vec<FeatureIndex> {
        let mut features: Vec<FeatureIndex> = (0..num_features).collect();
        if self.is_exhaustive(num_features) {
            return features;
        }

        features.shuffle(&mut self.rng);
        features.truncate(self.features_per_split);
        features.sort_unstable();
        features
    }
}
