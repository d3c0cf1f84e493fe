//! Loss function selection.

use crate::core::constants::{DEFAULT_HUBER_ALPHA, DEFAULT_QUANTILE_ALPHA};
use crate::core::error::{GbmError, Result};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Which loss the boosting learner minimizes.
///
/// Serialized with an inline `type` tag, e.g. `{ "type": "quantile", "alpha": 0.9 }`
/// in JSON or `type = "absolute"` under a `[loss]` table in TOML.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum LossConfig {
    /// Least squares; leaf values are residual means.
    Squared,
    /// Least absolute deviation; leaf values are residual medians.
    Absolute,
    /// Binomial deviance on 0/1 targets, fitted in log-odds space.
    Binomial,
    /// Pinball loss for the `alpha` quantile.
    Quantile {
        /// Target quantile in `(0, 1]`.
        alpha: f64,
    },
    /// Squared error up to the `alpha` percentile of absolute residuals,
    /// absolute error beyond it.
    Huber {
        /// Residual percentile in `(0, 1]`.
        alpha: f64,
    },
}

impl LossConfig {
    /// Quantile loss with the default alpha.
    pub fn quantile() -> Self {
        LossConfig::Quantile {
            alpha: DEFAULT_QUANTILE_ALPHA,
        }
    }

    /// Huber loss with the default alpha.
    pub fn huber() -> Self {
        LossConfig::Huber {
            alpha: DEFAULT_HUBER_ALPHA,
        }
    }

    /// Checks loss-specific parameters.
    pub fn validate(&self) -> Result<()> {
        if let LossConfig::Quantile { alpha } | LossConfig::Huber { alpha } = *self {
            if !(alpha > 0.0 && alpha <= 1.0) {
                return Err(GbmError::invalid_parameter(
                    "loss.alpha",
                    alpha.to_string(),
                    "must be in range (0.0, 1.0]",
                ));
            }
        }
        Ok(())
    }
}

impl Default for LossConfig {
    fn default() -> Self {
        LossConfig::Squared
    }
}

impl fmt::Display for LossConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            LossConfig::Squared => write!(f, "squared"),
            LossConfig::Absolute => write!(f, "absolute"),
            LossConfig::Binomial => write!(f, "binomial"),
            LossConfig::Quantile { alpha } => write!(f, "quantile(alpha={})", alpha),
            LossConfig::Huber { alpha } => write!(f, "huber(alpha={})", alpha),
        }
    }
}
