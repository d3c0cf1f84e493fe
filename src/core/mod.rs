//! Core infrastructure for the gradient boosting engine.
//!
//! - [`types`]: index aliases and the node position enum
//! - [`constants`]: default hyperparameters and seeds
//! - [`error`]: the crate error type and `Result` alias
//! - [`utils`]: worker pool, running median and numeric helpers
//!
//! ```rust
//! use gbm_rust::core::{
//!     constants::DEFAULT_LEARNING_RATE,
//!     error::{GbmError, Result},
//!     utils::RunningMedian,
//! };
//!
//! let mut median = RunningMedian::new();
//! median.add(DEFAULT_LEARNING_RATE);
//! assert_eq!(median.median(), DEFAULT_LEARNING_RATE);
//! # Ok::<(), GbmError>(())
//! ```

pub mod constants;
pub mod error;
pub mod types;
pub mod utils;

pub use constants::*;
pub use error::{GbmError, Result};
pub use types::*;

use std::sync::atomic::{AtomicBool, Ordering};

static CORE_INITIALIZED: AtomicBool = AtomicBool::new(false);

/// Initializes logging for the library.
///
/// Safe to call any number of times; only the first call installs the
/// logger. When `RUST_LOG` is unset the filter defaults to `info`.
pub fn initialize_core() -> Result<()> {
    if CORE_INITIALIZED.swap(true, Ordering::SeqCst) {
        return Ok(());
    }

    initialize_logging();
    log::info!("gbm-rust {} initialized", constants::GBM_RUST_VERSION);
    log::debug!("{} logical cores available", num_cpus::get());
    Ok(())
}

/// True once [`initialize_core`] has run.
pub fn is_core_initialized() -> bool {
    CORE_INITIALIZED.load(Ordering::SeqCst)
}

fn initialize_logging() {
    let env = env_logger::Env::default().default_filter_or("info");
    // Another logger may already be installed by the host application.
    let _ = env_logger::Builder::from_env(env).try_init();
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_initialize_core_is_idempotent() {
        assert!(initialize_core().is_ok());
        assert!(initialize_core().is_ok());
        assert!(is_core_initialized());
    }
}
