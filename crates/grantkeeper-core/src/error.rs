//! Error types for the Grantkeeper core.

use thiserror::Error;

/// Errors that can occur while decoding grant records.
#[derive(Debug, Error)]
pub enum CoreError {
    #[error("decoding error: {0}")]
    Decode(String),
}

impl From<serde_json::Error> for CoreError {
    fn from(e: serde_json::Error) -> Self {
        CoreError::Decode(e.to_string())
    }
}

/// Result type for core operations.
pub type Result<T> = std::result::Result<T, CoreError>;
