//! Error types for the usage store

use thiserror::Error;

#[derive(Debug, Error)]
pub enum StorageError {
    #[error("database error: {0}")]
    Database(#[from] rusqlite::Error),

    #[error("failed to prepare database location: {0}")]
    Io(#[from] std::io::Error),

    #[error("interface '{0}' not found")]
    InterfaceNotFound(String),

    #[error("stored row is not valid: {0}")]
    InvalidRow(String),

    #[error("database connection lock poisoned")]
    LockPoisoned,
}
