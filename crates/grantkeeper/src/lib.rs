//! # Grantkeeper
//!
//! In-memory cache of per-player grant trackers, backed by a document store
//! and kept consistent with player connectivity.
//!
//! ## Overview
//!
//! A lookup resolves a player through the [`Directory`], loads their grant
//! issuances from the [`GrantStore`](grantkeeper_store::GrantStore) on a
//! cache miss, and caches the resulting tracker. Online players stay cached
//! until they disconnect; offline players' trackers expire after a TTL.
//! Every lookup is announced on the message bus without waiting for it.
//!
//! ## Key Types
//!
//! - [`GrantService`] - Lookup orchestration; owns everything below
//! - [`TrackerCache`] - Cache-only lookup, load, and caching policy
//! - [`EvictionCoordinator`] - TTL eviction, guarded by online status
//! - [`KeyedTimerSet`] - Keyed TTL timers with a periodic sweep
//! - [`ConnectivityHooks`] - Connect/disconnect handling
//! - [`http::router`] - The HTTP surface
//!
//! ## Usage
//!
//! ```rust,no_run
//! use std::sync::Arc;
//!
//! use grantkeeper::{GrantService, MemoryDirectory, PlayerInfo, ServiceConfig};
//! use grantkeeper_bus::MemoryBus;
//! use grantkeeper_store::MemoryStore;
//!
//! async fn example() -> grantkeeper::Result<()> {
//!     let directory = Arc::new(MemoryDirectory::new());
//!     directory.insert(PlayerInfo::new("p1", "Alice", true));
//!
//!     let service = GrantService::builder(ServiceConfig::default())
//!         .store(Arc::new(MemoryStore::new()))
//!         .directory(directory)
//!         .bus(Arc::new(MemoryBus::new()))
//!         .build()?;
//!
//!     if let Some(tracker) = service.handle_lookup("alice", false).await? {
//!         println!("{} active grants", tracker.actives().len());
//!     }
//!     Ok(())
//! }
//! ```

pub mod cache;
pub mod config;
pub mod directory;
pub mod error;
pub mod eviction;
pub mod hooks;
pub mod http;
pub mod service;
pub mod timer;

pub use cache::{TrackerCache, TrackerMap};
pub use config::{DaemonConfig, ServiceConfig};
pub use directory::{ConnectivityHandler, Directory, DirectoryError, MemoryDirectory, PlayerInfo};
pub use error::{GrantsError, Result};
pub use eviction::EvictionCoordinator;
pub use hooks::ConnectivityHooks;
pub use service::{GrantService, GrantServiceBuilder};
pub use timer::{ExpireCallback, ExpireReason, ExpiryTimer, KeyedTimerSet};
