//! Sufficient statistics for a subset of samples.
//!
//! A [`SplitInfo`] is the running aggregate a loss function maintains while
//! the split search moves samples from the right side of a candidate split
//! to the left side. Moving one sample is `O(1)`.

use crate::core::types::NodePosition;

/// Running aggregate over the residuals of a sample subset.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct SplitInfo {
    /// Number of samples in the subset
    pub samples: usize,
    /// Sum of residuals
    pub sum: f64,
    /// Sum of squared residuals
    pub sum_of_squares: f64,
    /// Sum of `p * (1 - p)` terms, only maintained by the binomial loss
    pub binomial_sum: f64,
    /// Loss-specific cost of fitting the subset with a single constant
    pub cost: f64,
    /// Loss-specific optimal constant for the subset
    pub best_constant: f64,
    /// Which side of the parent split the subset belongs to
    pub position: NodePosition,
}

impl SplitInfo {
    /// An aggregate over no samples.
    pub fn new_empty() -> Self {
        Self::default()
    }

    /// Adds one residual to the count, sum and sum of squares.
    #[inline]
    pub fn add_residual(&mut self, residual: f64) {
        self.samples += 1;
        self.sum += residual;
        self.sum_of_squares += residual * residual;
    }

    /// Removes one residual from the count, sum and sum of squares.
    #[inline]
    pub fn remove_residual(&mut self, residual: f64) {
        self.samples -= 1;
        self.sum -= residual;
        self.sum_of_squares -= residual * residual;
    }

    /// `sum_of_squares - sum^2 / samples`, or 0 for an empty aggregate.
    #[inline]
    pub fn squared_error(&self) -> f64 {
        if self.samples == 0 {
            0.0
        } else {
            self.sum_of_squares - self.sum * self.sum / self.samples as f64
        }
    }

    /// Mean residual, or 0 for an empty aggregate.
    #[inline]
    pub fn mean(&self) -> f64 {
        if self.samples == 0 {
            0.0
        } else {
            self.sum / self.samples as f64
        }
    }

    /// Copy of this aggregate tagged with `position`.
    pub fn at(mut self, position: NodePosition) -> Self {
        self.position = position;
        self
    }
}
