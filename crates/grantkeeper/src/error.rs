//! Error types for the grant service.

use grantkeeper_store::StoreError;
use thiserror::Error;

use crate::directory::DirectoryError;

/// Errors that can occur during grant service operations.
#[derive(Debug, Error)]
pub enum GrantsError {
    /// A required collaborator was never supplied. Fatal at startup.
    #[error("not configured: no {0}")]
    NotConfigured(&'static str),

    /// The grant store is closed or was never opened.
    #[error("grant store unavailable")]
    StoreUnavailable,

    /// Querying the grant store failed.
    #[error("grant query failed: {0}")]
    QueryFailed(#[source] StoreError),

    /// A stored grant document is malformed.
    #[error("grant document decode failed: {0}")]
    DecodeFailed(String),

    /// The player directory failed.
    #[error("directory error: {0}")]
    Directory(#[from] DirectoryError),

    /// A connectivity event named a player the directory does not know.
    #[error("no such player: {0}")]
    NoSuchPlayer(String),

    /// The grant service has shut down or was never started.
    #[error("grant service not ready")]
    ServiceNotReady,
}

impl From<StoreError> for GrantsError {
    fn from(e: StoreError) -> Self {
        match e {
            StoreError::Unavailable => GrantsError::StoreUnavailable,
            StoreError::Decode(msg) => GrantsError::DecodeFailed(msg),
            other => GrantsError::QueryFailed(other),
        }
    }
}

impl From<grantkeeper_core::CoreError> for GrantsError {
    fn from(e: grantkeeper_core::CoreError) -> Self {
        match e {
            grantkeeper_core::CoreError::Decode(msg) => GrantsError::DecodeFailed(msg),
        }
    }
}

/// Result type for grant service operations.
pub type Result<T> = std::result::Result<T, GrantsError>;
