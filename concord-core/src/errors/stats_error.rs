//! Statistics engine errors.
//!
//! Only outlier detection raises: statistics that can be legitimately
//! undefined (empty mean, unidentifiable variance terms) return NaN
//! instead of an error.

use super::error_code::{self, ConcordErrorCode};

/// Errors that can occur during outlier detection.
#[derive(Debug, thiserror::Error)]
pub enum StatsError {
    #[error("outlier scan over empty data in scope {scope}")]
    EmptyScope { scope: String },

    #[error("outlier scan over zero-variance data in scope {scope}")]
    ZeroVariance { scope: String },
}

impl ConcordErrorCode for StatsError {
    fn error_code(&self) -> &'static str {
        error_code::DEGENERATE_INPUT
    }
}
