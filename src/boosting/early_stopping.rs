//! Validation tracking for early stopping.
//!
//! The validation error is measured for the constant model and then after
//! every `rounds` fitted trees. Training runs to the configured number of
//! iterations; the tracker remembers which tree count scored best so the
//! learner can truncate the ensemble to it.

use crate::core::error::{GbmError, Result};

/// Tracks the best validation error seen at the checkpoints.
#[derive(Debug, Clone)]
pub struct EarlyStopping {
    rounds: usize,
    best_error: f64,
    best_tree_count: usize,
    history: Vec<(usize, f64)>,
}

impl EarlyStopping {
    /// Creates a tracker checking every `rounds` trees of a run with
    /// `iterations` boosting stages.
    pub fn new(rounds: usize, iterations: usize) -> Result<Self> {
        if rounds == 0 || rounds >= iterations {
            return Err(GbmError::invalid_parameter(
                "early_stopping_rounds",
                rounds.to_string(),
                format!("must be in 1..{} (the number of iterations)", iterations),
            ));
        }

        Ok(EarlyStopping {
            rounds,
            best_error: f64::INFINITY,
            best_tree_count: 0,
            history: Vec::new(),
        })
    }

    /// True if the validation error should be measured at `tree_count` trees.
    pub fn is_checkpoint(&self, tree_count: usize) -> bool {
        tree_count % self.rounds == 0
    }

    /// Records the validation error at `tree_count` trees and returns true
    /// if it is the best seen so far.
    pub fn update(&mut self, tree_count: usize, error: f64) -> bool {
        self.history.push((tree_count, error));
        log::info!("Trees {}: validation error {:.6}", tree_count, error);

        if error < self.best_error {
            self.best_error = error;
            self.best_tree_count = tree_count;
            true
        } else {
            false
        }
    }

    /// Tree count with the lowest validation error.
    pub fn best_tree_count(&self) -> usize {
        self.best_tree_count
    }

    /// Lowest validation error seen.
    pub fn best_error(&self) -> f64 {
        self.best_error
    }

    /// All recorded `(tree_count, error)` checkpoints.
    pub fn history(&self) -> &[(usize, f64)] {
        &self.history
    }
}
