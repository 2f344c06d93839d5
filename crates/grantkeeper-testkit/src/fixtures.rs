//! Test fixtures and helpers.
//!
//! Common setup code for integration tests.

use std::sync::Arc;

use grantkeeper::{GrantService, MemoryDirectory, PlayerInfo, ServiceConfig};
use grantkeeper_bus::MemoryBus;
use grantkeeper_core::{Grant, GrantInfo, Timestamp};
use grantkeeper_store::traits::SOURCE_ID_FIELD;
use grantkeeper_store::{Document, MemoryStore};

/// Builder for a stored grant document.
#[derive(Debug, Clone)]
pub struct GrantDoc {
    source_id: String,
    info: GrantInfo,
}

/// Start building a never-expiring `rank:default` grant document.
pub fn grant_doc(id: &str, source_id: &str) -> GrantDoc {
    GrantDoc {
        source_id: source_id.to_string(),
        info: GrantInfo::new(
            id,
            Grant::new("rank", "default"),
            "console",
            Timestamp::from_secs(1_700_000_000),
            Timestamp::ZERO,
        ),
    }
}

impl GrantDoc {
    pub fn grant(mut self, key: &str, value: &str) -> Self {
        self.info = GrantInfo::new(
            self.info.id(),
            Grant::new(key, value),
            self.info.added_by(),
            self.info.added_at(),
            self.info.expires_at(),
        )
        .with_scopes(self.info.scopes().to_vec());
        self
    }

    pub fn expires_at(mut self, secs: i64) -> Self {
        self.info = GrantInfo::new(
            self.info.id(),
            self.info.grant().clone(),
            self.info.added_by(),
            self.info.added_at(),
            Timestamp::from_secs(secs),
        )
        .with_scopes(self.info.scopes().to_vec());
        self
    }

    pub fn scopes(mut self, scopes: &[&str]) -> Self {
        self.info = self
            .info
            .with_scopes(scopes.iter().map(|s| s.to_string()).collect());
        self
    }

    pub fn revoked(mut self, by: &str, at: i64) -> Self {
        self.info.revoke(by, Timestamp::from_secs(at));
        self
    }

    /// The record as the service will decode it.
    pub fn info(&self) -> &GrantInfo {
        &self.info
    }

    /// The document as the issuance path stores it.
    pub fn build(self) -> Document {
        let mut doc = match serde_json::to_value(&self.info) {
            Ok(serde_json::Value::Object(map)) => map,
            _ => Document::new(),
        };
        doc.insert(SOURCE_ID_FIELD.into(), self.source_id.into());
        doc
    }
}

/// A grant service wired to in-memory collaborators.
///
/// Must be created inside a Tokio runtime.
pub struct TestFixture {
    pub store: Arc<MemoryStore>,
    pub directory: Arc<MemoryDirectory>,
    pub bus: Arc<MemoryBus>,
    pub service: Arc<GrantService>,
}

impl TestFixture {
    /// Create a fixture with the default configuration.
    pub fn new() -> Self {
        Self::with_config(ServiceConfig {
            service_id: "testkit".into(),
            ..ServiceConfig::default()
        })
    }

    /// Create a fixture with a custom configuration.
    pub fn with_config(config: ServiceConfig) -> Self {
        let store = Arc::new(MemoryStore::new());
        let directory = Arc::new(MemoryDirectory::new());
        let bus = Arc::new(MemoryBus::new());
        let service = match GrantService::builder(config)
            .store(store.clone())
            .directory(directory.clone())
            .bus(bus.clone())
            .build()
        {
            Ok(service) => service,
            Err(e) => panic!("fixture service failed to build: {e}"),
        };
        Self {
            store,
            directory,
            bus,
            service,
        }
    }

    pub fn add_player(&self, id: &str, name: &str, online: bool) {
        self.directory.insert(PlayerInfo::new(id, name, online));
    }

    pub fn add_grant(&self, doc: Document) {
        self.store.insert(doc);
    }
}

impl Default for TestFixture {
    fn default() -> Self {
        Self::new()
    }
}
