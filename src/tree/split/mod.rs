//! Split statistics and the per-feature split search.

pub mod finder;
pub mod info;

pub use finder::{next_allowed_index, GbmSplit, SplitResult, SplitSearch};
pub use info::SplitInfo;
