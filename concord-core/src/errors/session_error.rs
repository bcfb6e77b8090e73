//! Session errors.

use super::error_code::ConcordErrorCode;
use super::{ConfigError, MaskError, StatsError, StorageError, StoreError};

/// Errors surfaced by session-level composite operations.
/// Aggregates subsystem errors via `From` conversions.
#[derive(Debug, thiserror::Error)]
pub enum SessionError {
    #[error("Mask error: {0}")]
    Mask(#[from] MaskError),

    #[error("Statistics error: {0}")]
    Stats(#[from] StatsError),

    #[error("Store error: {0}")]
    Store(#[from] StoreError),

    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    #[error("Storage error: {0}")]
    Storage(#[from] StorageError),

    #[error("unknown rating name: {name}")]
    UnknownRatingName { name: String },
}

impl ConcordErrorCode for SessionError {
    fn error_code(&self) -> &'static str {
        match self {
            Self::Mask(e) => e.error_code(),
            Self::Stats(e) => e.error_code(),
            Self::Store(e) => e.error_code(),
            Self::Config(e) => e.error_code(),
            Self::Storage(e) => e.error_code(),
            Self::UnknownRatingName { .. } => super::error_code::STORE_ERROR,
        }
    }
}
