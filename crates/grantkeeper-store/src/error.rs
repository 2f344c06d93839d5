//! Error types for the store module.

use thiserror::Error;

/// Errors that can occur during store operations.
#[derive(Debug, Error)]
pub enum StoreError {
    /// Database error from SQLite.
    #[error("database error: {0}")]
    Database(#[from] rusqlite::Error),

    /// A stored document could not be decoded.
    #[error("decode error: {0}")]
    Decode(String),

    /// A document is missing a required field or has the wrong shape.
    #[error("invalid data: {0}")]
    InvalidData(String),

    /// Migration error.
    #[error("migration error: {0}")]
    Migration(String),

    /// The store is not open.
    #[error("store unavailable")]
    Unavailable,
}

/// Result type for store operations.
pub type Result<T> = std::result::Result<T, StoreError>;
