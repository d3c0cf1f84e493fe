//! Row subsampling for stochastic gradient boosting.

use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use rand::SeedableRng;

/// Draws the rows each tree is fitted on.
///
/// Each draw shuffles the caller's work indices in place and keeps the first
/// `round(ratio * work_indices.len())` of them, so the draws of a training
/// call form one reproducible stream for a given seed.
#[derive(Debug, Clone)]
pub struct SubSampler {
    ratio: f64,
    rng: StdRng,
}

impl SubSampler {
    /// Creates a sampler keeping `ratio` of the work indices per draw.
    pub fn new(ratio: f64, seed: u64) -> Self {
        SubSampler {
            ratio,
            rng: StdRng::seed_from_u64(seed),
        }
    }

    /// Returns the sampling ratio.
    pub fn ratio(&self) -> f64 {
        self.ratio
    }

    /// True when every draw keeps all work indices.
    pub fn is_full(&self) -> bool {
        self.ratio >= 1.0
    }

    /// Number of rows kept out of `available`.
    pub fn sample_size(&self, available: usize) -> usize {
        (self.ratio * available as f64).round() as usize
    }

    /// In-sample mask of length `num_samples` for the next draw.
    pub fn sample(&mut self, work_indices: &mut [usize], num_samples: usize) -> Vec<bool> {
        let size = self.sample_size(work_indices.len()).min(work_indices.len());
        work_indices.shuffle(&mut self.rng);

        let mut in_sample = vec![false; num_samples];
        for &index in &work_indices[..size] {
            in_sample[index] = true;
        }
        in_sample
    }
}
