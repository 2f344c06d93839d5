//! Player directory abstraction.
//!
//! The directory is owned by another service. Grantkeeper consumes it to
//! resolve identities and online status, and subscribes to its
//! connectivity events to invalidate cached trackers.

use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, PoisonError, RwLock};

use async_trait::async_trait;
use serde::Deserialize;
use thiserror::Error;

use crate::error::GrantsError;

/// Errors reported by a directory implementation.
#[derive(Debug, Error)]
pub enum DirectoryError {
    #[error("directory unavailable")]
    Unavailable,

    #[error("directory lookup failed: {0}")]
    Lookup(String),
}

/// A resolved player identity.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct PlayerInfo {
    id: String,
    name: String,
    #[serde(default)]
    online: bool,
}

impl PlayerInfo {
    pub fn new(id: impl Into<String>, name: impl Into<String>, online: bool) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            online,
        }
    }

    pub fn id(&self) -> &str {
        &self.id
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn online(&self) -> bool {
        self.online
    }
}

/// Receives player connect and disconnect events.
#[async_trait]
pub trait ConnectivityHandler: Send + Sync {
    async fn on_connect(&self, id: &str) -> Result<(), GrantsError>;

    async fn on_disconnect(&self, id: &str) -> Result<(), GrantsError>;
}

/// Player identity lookup.
///
/// The `resolve_*` methods may go to a remote service. `cached_by_id`
/// must answer from local state only.
#[async_trait]
pub trait Directory: Send + Sync {
    async fn resolve_by_id(&self, id: &str) -> Result<Option<PlayerInfo>, DirectoryError>;

    async fn resolve_by_name(&self, name: &str) -> Result<Option<PlayerInfo>, DirectoryError>;

    /// Non-blocking, cache-only lookup.
    fn cached_by_id(&self, id: &str) -> Option<PlayerInfo>;

    fn register_connectivity_handler(&self, handler: Arc<dyn ConnectivityHandler>);
}

#[derive(Default)]
struct Players {
    by_id: HashMap<String, PlayerInfo>,
    /// Lowercased name to ID.
    by_name: HashMap<String, String>,
}

/// In-memory directory for tests and single-process deployments.
///
/// Connectivity events are driven by calling [`connect`](Self::connect) and
/// [`disconnect`](Self::disconnect).
#[derive(Default)]
pub struct MemoryDirectory {
    players: RwLock<Players>,
    handlers: RwLock<Vec<Arc<dyn ConnectivityHandler>>>,
    unavailable: AtomicBool,
}

impl MemoryDirectory {
    pub fn new() -> Self {
        Self::default()
    }

    /// A directory that already knows `players`.
    pub fn with_players(players: impl IntoIterator<Item = PlayerInfo>) -> Self {
        let directory = Self::new();
        for player in players {
            directory.insert(player);
        }
        directory
    }

    /// Add or replace a player.
    pub fn insert(&self, player: PlayerInfo) {
        let mut players = self.players.write().unwrap_or_else(PoisonError::into_inner);
        if let Some(old) = players.by_id.get(player.id()) {
            let old_name = old.name().to_lowercase();
            players.by_name.remove(&old_name);
        }
        players
            .by_name
            .insert(player.name().to_lowercase(), player.id().to_string());
        players.by_id.insert(player.id().to_string(), player);
    }

    /// Forget a player.
    pub fn remove(&self, id: &str) -> Option<PlayerInfo> {
        let mut players = self.players.write().unwrap_or_else(PoisonError::into_inner);
        let removed = players.by_id.remove(id)?;
        players.by_name.remove(&removed.name().to_lowercase());
        Some(removed)
    }

    /// Make the `resolve_*` methods fail (or succeed again).
    pub fn set_unavailable(&self, unavailable: bool) {
        self.unavailable.store(unavailable, Ordering::SeqCst);
    }

    /// Mark a player online and notify every handler.
    pub async fn connect(&self, id: &str) -> Result<(), GrantsError> {
        self.set_online(id, true);
        for handler in self.handlers() {
            handler.on_connect(id).await?;
        }
        Ok(())
    }

    /// Mark a player offline and notify every handler.
    pub async fn disconnect(&self, id: &str) -> Result<(), GrantsError> {
        self.set_online(id, false);
        for handler in self.handlers() {
            handler.on_disconnect(id).await?;
        }
        Ok(())
    }

    fn set_online(&self, id: &str, online: bool) {
        let mut players = self.players.write().unwrap_or_else(PoisonError::into_inner);
        if let Some(player) = players.by_id.get_mut(id) {
            player.online = online;
        }
    }

    fn handlers(&self) -> Vec<Arc<dyn ConnectivityHandler>> {
        self.handlers
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    fn check_available(&self) -> Result<(), DirectoryError> {
        if self.unavailable.load(Ordering::SeqCst) {
            return Err(DirectoryError::Unavailable);
        }
        Ok(())
    }
}

#[async_trait]
impl Directory for MemoryDirectory {
    async fn resolve_by_id(&self, id: &str) -> Result<Option<PlayerInfo>, DirectoryError> {
        self.check_available()?;
        Ok(self.cached_by_id(id))
    }

    async fn resolve_by_name(&self, name: &str) -> Result<Option<PlayerInfo>, DirectoryError> {
        self.check_available()?;
        let players = self.players.read().unwrap_or_else(PoisonError::into_inner);
        Ok(players
            .by_name
            .get(&name.to_lowercase())
            .and_then(|id| players.by_id.get(id))
            .cloned())
    }

    fn cached_by_id(&self, id: &str) -> Option<PlayerInfo> {
        self.players
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .by_id
            .get(id)
            .cloned()
    }

    fn register_connectivity_handler(&self, handler: Arc<dyn ConnectivityHandler>) {
        self.handlers
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .push(handler);
    }
}
