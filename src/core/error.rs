//! Error handling and error types for the gradient boosting engine.
//!
//! All fallible operations in the crate return [`Result`], whose error side is
//! [`GbmError`]. Hyperparameter problems surface as [`GbmError::InvalidParameter`]
//! at construction time, before any data is touched; shape problems in the
//! inputs surface as [`GbmError::DimensionMismatch`] at the call site.

use std::io;
use thiserror::Error;

/// Main error type for the gradient boosting library.
#[derive(Error, Debug)]
pub enum GbmError {
    /// Configuration loading or consistency errors
    #[error("Configuration error: {message}")]
    Config {
        /// Description of the configuration problem
        message: String,
    },

    /// Training-related errors
    #[error("Training error: {message}")]
    Training {
        /// Description of the training failure
        message: String,
    },

    /// Tree construction errors
    #[error("Tree construction error: {message}")]
    TreeConstruction {
        /// Description of the structural problem
        message: String,
    },

    /// Prediction errors
    #[error("Prediction error: {message}")]
    Prediction {
        /// Description of the prediction failure
        message: String,
    },

    /// File I/O errors
    #[error("I/O error: {source}")]
    Io {
        /// Underlying I/O error
        #[from]
        source: io::Error,
    },

    /// JSON serialization errors
    #[error("JSON error: {source}")]
    Json {
        /// Underlying serde_json error
        #[from]
        source: serde_json::Error,
    },

    /// Worker pool errors
    #[error("Threading error: {message}")]
    Threading {
        /// Description of the threading failure
        message: String,
    },

    /// Invalid input parameters
    #[error("Invalid parameter: {parameter} = {value}, {reason}")]
    InvalidParameter {
        /// Name of the offending parameter
        parameter: String,
        /// Value that was supplied
        value: String,
        /// Why the value was rejected
        reason: String,
    },

    /// Dimension mismatch errors
    #[error("Dimension mismatch: expected {expected}, got {actual}")]
    DimensionMismatch {
        /// Expected shape or length
        expected: String,
        /// Actual shape or length
        actual: String,
    },

    /// Out of bounds access
    #[error("Index out of bounds: index {index}, length {length}")]
    IndexOutOfBounds {
        /// Offending index
        index: usize,
        /// Length of the indexed collection
        length: usize,
    },

    /// Internal library errors (should not occur in normal usage)
    #[error("Internal error: {message}")]
    Internal {
        /// Description of the broken internal assumption
        message: String,
    },
}

/// Type alias for Results using GbmError
pub type Result<T> = std::result::Result<T, GbmError>;

impl GbmError {
    /// Create a configuration error
    pub fn config<S: Into<String>>(message: S) -> Self {
        GbmError::Config {
            message: message.into(),
        }
    }

    /// Create a training error
    pub fn training<S: Into<String>>(message: S) -> Self {
        GbmError::Training {
            message: message.into(),
        }
    }

    /// Create a tree construction error
    pub fn tree_construction<S: Into<String>>(message: S) -> Self {
        GbmError::TreeConstruction {
            message: message.into(),
        }
    }

    /// Create a prediction error
    pub fn prediction<S: Into<String>>(message: S) -> Self {
        GbmError::Prediction {
            message: message.into(),
        }
    }

    /// Create a threading error
    pub fn threading<S: Into<String>>(message: S) -> Self {
        GbmError::Threading {
            message: message.into(),
        }
    }

    /// Create an invalid parameter error
    pub fn invalid_parameter<P, V, R>(parameter: P, value: V, reason: R) -> Self
    where
        P: Into<String>,
        V: Into<String>,
        R: Into<String>,
    {
        GbmError::InvalidParameter {
            parameter: parameter.into(),
            value: value.into(),
            reason: reason.into(),
        }
    }

    /// Create a dimension mismatch error
    pub fn dimension_mismatch<E, A>(expected: E, actual: A) -> Self
    where
        E: Into<String>,
        A: Into<String>,
    {
        GbmError::DimensionMismatch {
            expected: expected.into(),
            actual: actual.into(),
        }
    }

    /// Create an index out of bounds error
    pub fn index_out_of_bounds(index: usize, length: usize) -> Self {
        GbmError::IndexOutOfBounds { index, length }
    }

    /// Create an internal error (should be used sparingly)
    pub fn internal<S: Into<String>>(message: S) -> Self {
        GbmError::Internal {
            message: message.into(),
        }
    }

    /// Check if retrying with different inputs could succeed.
    pub fn is_recoverable(&self) -> bool {
        match self {
            GbmError::Config { .. } => false,
            GbmError::Training { .. } => true,
            GbmError::TreeConstruction { .. } => true,
            GbmError::Prediction { .. } => true,
            GbmError::Io { .. } => false,
            GbmError::Json { .. } => false,
            GbmError::Threading { .. } => true,
            GbmError::InvalidParameter { .. } => false,
            GbmError::DimensionMismatch { .. } => false,
            GbmError::IndexOutOfBounds { .. } => false,
            GbmError::Internal { .. } => false,
        }
    }

    /// Get error category for logging
    pub fn category(&self) -> &'static str {
        match self {
            GbmError::Config { .. } => "config",
            GbmError::Training { .. } => "training",
            GbmError::TreeConstruction { .. } => "tree_construction",
            GbmError::Prediction { .. } => "prediction",
            GbmError::Io { .. } => "io",
            GbmError::Json { .. } => "json",
            GbmError::Threading { .. } => "threading",
            GbmError::InvalidParameter { .. } => "invalid_parameter",
            GbmError::DimensionMismatch { .. } => "dimension_mismatch",
            GbmError::IndexOutOfBounds { .. } => "index_out_of_bounds",
            GbmError::Internal { .. } => "internal",
        }
    }
}

/// Convenience macros for error creation
#[macro_export]
macro_rules! config_error {
    ($msg:expr) => {
        $crate::core::error::GbmError::config($msg)
    };
    ($fmt:expr, $($arg:tt)*) => {
        $crate::core::error::GbmError::config(format!($fmt, $($arg)*))
    };
}

/// Builds a [`GbmError::Training`](crate::core::error::GbmError::Training) from a message or format string.
#[macro_export]
macro_rules! training_error {
    ($msg:expr) => {
        $crate::core::error::GbmError::training($msg)
    };
    ($fmt:expr, $($arg:tt)*) => {
        $crate::core::error::GbmError::training(format!($fmt, $($arg)*))
    };
}

/// Returns early with the given error when the condition does not hold.
#[macro_export]
macro_rules! ensure {
    ($cond:expr, $err:expr) => {
        if !($cond) {
            return Err($err.into());
        }
    };
}
