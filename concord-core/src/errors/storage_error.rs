//! Persistence errors.

use super::error_code::{self, ConcordErrorCode};

/// Errors that can occur in the SQLite persistence layer.
#[derive(Debug, thiserror::Error)]
pub enum StorageError {
    #[error("Database corrupt: {message}")]
    DbCorrupt { message: String },

    #[error("Migration to version {version} failed: {message}")]
    MigrationFailed { version: u32, message: String },

    #[error("Database error: {message}")]
    Sqlite { message: String },

    #[error("Session snapshot is incomplete: {message}")]
    IncompleteSnapshot { message: String },
}

impl ConcordErrorCode for StorageError {
    fn error_code(&self) -> &'static str {
        match self {
            Self::DbCorrupt { .. } => error_code::DB_CORRUPT,
            Self::MigrationFailed { .. } => error_code::MIGRATION_FAILED,
            _ => error_code::STORAGE_ERROR,
        }
    }
}
