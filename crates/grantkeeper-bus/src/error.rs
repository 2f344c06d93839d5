//! Error types for the bus module.

use thiserror::Error;

/// Errors that can occur while publishing.
#[derive(Debug, Error)]
pub enum BusError {
    /// The bus rejected or failed to deliver the message.
    #[error("publish error: {0}")]
    Publish(String),

    /// The message could not be encoded.
    #[error("encode error: {0}")]
    Encode(#[from] serde_json::Error),
}

/// Result type for bus operations.
pub type Result<T> = std::result::Result<T, BusError>;
