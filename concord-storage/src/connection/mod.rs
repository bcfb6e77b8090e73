//! Connection management: one serialized write connection.
//!
//! Snapshot saves and loads are whole-database operations issued by a
//! single operator, so one mutex-guarded connection is enough. WAL mode
//! still keeps the file readable by external tools while a save runs.

pub mod pragmas;

use std::path::{Path, PathBuf};
use std::sync::Mutex;

use concord_core::errors::StorageError;
use rusqlite::Connection;

use self::pragmas::apply_pragmas;
use crate::migrations;

/// Manages the single write connection of a snapshot database.
pub struct DatabaseManager {
    writer: Mutex<Connection>,
    path: Option<PathBuf>,
}

impl DatabaseManager {
    /// Open a database at the given path, apply pragmas, run migrations.
    pub fn open(path: &Path) -> Result<Self, StorageError> {
        let writer = Connection::open(path).map_err(|e| StorageError::Sqlite {
            message: e.to_string(),
        })?;
        apply_pragmas(&writer)?;
        migrations::run_migrations(&writer)?;

        Ok(Self {
            writer: Mutex::new(writer),
            path: Some(path.to_path_buf()),
        })
    }

    /// Open an in-memory database (for testing).
    pub fn open_in_memory() -> Result<Self, StorageError> {
        let writer = Connection::open_in_memory().map_err(|e| StorageError::Sqlite {
            message: e.to_string(),
        })?;
        apply_pragmas(&writer)?;
        migrations::run_migrations(&writer)?;

        Ok(Self {
            writer: Mutex::new(writer),
            path: None,
        })
    }

    /// Execute an operation with the serialized writer connection.
    pub fn with_writer<F, T>(&self, f: F) -> Result<T, StorageError>
    where
        F: FnOnce(&Connection) -> Result<T, StorageError>,
    {
        let guard = self.writer.lock().map_err(|_| StorageError::Sqlite {
            message: "write lock poisoned".to_string(),
        })?;
        f(&guard)
    }

    /// Run a WAL checkpoint (TRUNCATE mode) after a save completes.
    pub fn checkpoint(&self) -> Result<(), StorageError> {
        self.with_writer(|conn| {
            conn.execute_batch("PRAGMA wal_checkpoint(TRUNCATE);")
                .map_err(|e| StorageError::Sqlite {
                    message: e.to_string(),
                })
        })
    }

    /// Get the database file path (None for in-memory).
    pub fn path(&self) -> Option<&Path> {
        self.path.as_deref()
    }
}
