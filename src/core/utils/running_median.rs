//! Streaming median over two balanced heaps.

use ordered_float::OrderedFloat;
use std::cmp::Reverse;
use std::collections::BinaryHeap;

/// Median of a growing sequence of values.
///
/// The lower half lives in a max-heap and the upper half in a min-heap. The
/// heaps are kept balanced so that the lower half holds at most one value
/// more than the upper half. Insertion is `O(log n)` and the median query is
/// `O(1)`.
#[derive(Debug, Clone, Default)]
pub struct RunningMedian {
    lower: BinaryHeap<OrderedFloat<f64>>,
    upper: BinaryHeap<Reverse<OrderedFloat<f64>>>,
}

impl RunningMedian {
    /// Creates an empty running median.
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds a value.
    pub fn add(&mut self, value: f64) {
        let value = OrderedFloat(value);
        match self.lower.peek() {
            Some(&top) if value > top => self.upper.push(Reverse(value)),
            _ => self.lower.push(value),
        }
        self.rebalance();
    }

    /// Current median. An empty container reports 0.0.
    pub fn median(&self) -> f64 {
        match (self.lower.peek(), self.upper.peek()) {
            (None, _) => 0.0,
            (Some(low), Some(Reverse(high))) if self.lower.len() == self.upper.len() => {
                (low.0 + high.0) / 2.0
            }
            (Some(low), _) => low.0,
        }
    }

    /// Number of values added so far.
    pub fn len(&self) -> usize {
        self.lower.len() + self.upper.len()
    }

    /// True when no value has been added.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    fn rebalance(&mut self) {
        if self.lower.len() > self.upper.len() + 1 {
            if let Some(value) = self.lower.pop() {
                self.upper.push(Reverse(value));
            }
        } else if self.upper.len() > self.lower.len() {
            if let Some(Reverse(value)) = self.upper.pop() {
                self.lower.push(value);
            }
        }
    }
}

impl Extend<f64> for RunningMedian {
    fn extend<I: IntoIterator<Item = f64>>(&mut self, iter: I) {
        for value in iter {
            self.add(value);
        }
    }
}

impl FromIterator<f64> for RunningMedian {
    fn from_iter<I: IntoIterator<Item = f64>>(iter: I) -> Self {
        let mut median = RunningMedian::new();
        median.extend(iter);
        median
    }
}
