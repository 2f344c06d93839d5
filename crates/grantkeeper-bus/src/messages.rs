//! Bus message types.

use bytes::Bytes;
use serde::{Deserialize, Serialize};

use grantkeeper_core::TrackerSnapshot;

use crate::error::Result;

/// Default subject for lookup notifications.
pub const LOOKUP_SUBJECT: &str = "grants_lookup";

/// Announces that a service instance served a grant lookup for a player.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LookupNotice {
    /// Identity of the publishing service instance.
    pub service_id: String,
    /// The player whose grants were looked up.
    pub player_id: String,
    /// The player's grants as served.
    pub body: TrackerSnapshot,
}

/// Encode any bus message as JSON bytes.
pub fn encode<T: Serialize>(message: &T) -> Result<Bytes> {
    Ok(Bytes::from(serde_json::to_vec(message)?))
}

impl LookupNotice {
    /// Decode from JSON bytes.
    pub fn from_bytes(bytes: &[u8]) -> Result<Self> {
        Ok(serde_json::from_slice(bytes)?)
    }
}
