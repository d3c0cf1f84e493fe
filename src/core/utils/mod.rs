//! Utilities shared across the engine.

/// Numeric helpers (sanitizing, sigmoid, order statistics)
pub mod math;
/// Two-heap streaming median
pub mod running_median;
/// Worker pool, work queue and result collection
pub mod threading;

pub use math::{median, nan_to_num, score_at_percentile, sigmoid};
pub use running_median::RunningMedian;
pub use threading::{ResultBag, WorkQueue, Worker, WorkerPool};
