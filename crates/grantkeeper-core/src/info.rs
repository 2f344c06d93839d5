//! Grant issuance records.
//!
//! A [`GrantInfo`] is one issuance of a [`Grant`] to a player. Records are
//! created and persisted by the issuance path; this crate only reads them,
//! apart from the revocation fields.

use serde::ser::SerializeMap;
use serde::{Deserialize, Serialize, Serializer};

use crate::error::Result;
use crate::grant::Grant;
use crate::time::Timestamp;

/// One issuance of a grant to a player.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct GrantInfo {
    #[serde(rename = "_id")]
    id: String,

    grant: Grant,

    added_by: String,
    added_at: Timestamp,

    /// Zero means the grant never expires.
    expires_at: Timestamp,

    #[serde(default)]
    revoked_by: Option<String>,
    #[serde(default)]
    revoked_at: Option<Timestamp>,

    scopes: Vec<String>,
}

impl GrantInfo {
    /// Create a new, unrevoked grant issuance.
    pub fn new(
        id: impl Into<String>,
        grant: Grant,
        added_by: impl Into<String>,
        added_at: Timestamp,
        expires_at: Timestamp,
    ) -> Self {
        Self {
            id: id.into(),
            grant,
            added_by: added_by.into(),
            added_at,
            expires_at,
            revoked_by: None,
            revoked_at: None,
            scopes: Vec::new(),
        }
    }

    /// Set the scopes this issuance applies to.
    pub fn with_scopes(mut self, scopes: Vec<String>) -> Self {
        self.scopes = scopes;
        self
    }

    pub fn id(&self) -> &str {
        &self.id
    }

    pub fn grant(&self) -> &Grant {
        &self.grant
    }

    pub fn added_by(&self) -> &str {
        &self.added_by
    }

    pub fn added_at(&self) -> Timestamp {
        self.added_at
    }

    pub fn expires_at(&self) -> Timestamp {
        self.expires_at
    }

    pub fn revoked_by(&self) -> Option<&str> {
        self.revoked_by.as_deref()
    }

    pub fn revoked_at(&self) -> Option<Timestamp> {
        self.revoked_at
    }

    pub fn scopes(&self) -> &[String] {
        &self.scopes
    }

    /// Record a revocation. Both revocation fields are always set together.
    pub fn revoke(&mut self, by: impl Into<String>, at: Timestamp) {
        self.revoked_by = Some(by.into());
        self.revoked_at = Some(at);
    }

    /// Whether this issuance is expired at `now`.
    ///
    /// Revoked issuances are always expired. Otherwise an issuance with a
    /// positive `expires_at` is expired once `now` is strictly past it.
    pub fn is_expired_at(&self, now: Timestamp) -> bool {
        if self.revoked_at.is_some_and(|at| !at.is_zero()) {
            return true;
        }

        self.expires_at > Timestamp::ZERO && now > self.expires_at
    }

    /// Whether this issuance is expired right now.
    pub fn is_expired(&self) -> bool {
        self.is_expired_at(Timestamp::now())
    }

    /// Whether the revocation pair is complete and would be serialized.
    fn has_revocation(&self) -> bool {
        matches!(
            (&self.revoked_by, self.revoked_at),
            (Some(by), Some(at)) if !by.is_empty() && !at.is_zero()
        )
    }

    /// Decode a stored document.
    ///
    /// Fields outside the record schema (such as `source_id`) are ignored.
    pub fn from_document(doc: serde_json::Map<String, serde_json::Value>) -> Result<Self> {
        Ok(serde_json::from_value(serde_json::Value::Object(doc))?)
    }
}

impl Serialize for GrantInfo {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        let revoked = self.has_revocation();
        let mut map = serializer.serialize_map(Some(if revoked { 8 } else { 6 }))?;
        map.serialize_entry("_id", &self.id)?;
        map.serialize_entry("grant", &self.grant)?;
        map.serialize_entry("added_by", &self.added_by)?;
        map.serialize_entry("added_at", &self.added_at)?;
        map.serialize_entry("expires_at", &self.expires_at)?;
        map.serialize_entry("scopes", &self.scopes)?;
        if revoked {
            map.serialize_entry("revoked_by", &self.revoked_by)?;
            map.serialize_entry("revoked_at", &self.revoked_at)?;
        }
        map.end()
    }
}
