//! The grant service: lookup orchestration over the tracker cache.
//!
//! [`GrantService`] owns the cache, the TTL timers, and the lookup
//! publisher. It is built once per process and shared as an
//! `Arc<GrantService>` with the HTTP layer and the directory's
//! connectivity events.

use std::sync::Arc;

use grantkeeper_bus::{LookupNotice, MessageBus, Publisher};
use grantkeeper_core::Tracker;
use grantkeeper_store::GrantStore;

use crate::cache::{TrackerCache, TrackerMap};
use crate::config::ServiceConfig;
use crate::directory::Directory;
use crate::error::{GrantsError, Result};
use crate::eviction::EvictionCoordinator;
use crate::hooks::ConnectivityHooks;
use crate::timer::KeyedTimerSet;

/// Per-process grant lookup service.
pub struct GrantService {
    config: ServiceConfig,
    directory: Arc<dyn Directory>,
    cache: TrackerCache,
    timers: Arc<KeyedTimerSet>,
    publisher: Publisher,
}

impl GrantService {
    /// Start building a service with the given configuration.
    pub fn builder(config: ServiceConfig) -> GrantServiceBuilder {
        GrantServiceBuilder::new(config)
    }

    pub fn config(&self) -> &ServiceConfig {
        &self.config
    }

    // ─────────────────────────────────────────────────────────────────────────
    // Lookups
    // ─────────────────────────────────────────────────────────────────────────

    /// Resolve a player and return their tracker, loading and caching it on
    /// first use.
    ///
    /// `identifier` is a player ID when `by_source_id` is set, otherwise a
    /// player name. An unknown player is `Ok(None)`, not an error. Every
    /// successful lookup announces the tracker on the bus; publication
    /// problems are logged and never fail the lookup.
    pub async fn handle_lookup(
        &self,
        identifier: &str,
        by_source_id: bool,
    ) -> Result<Option<Arc<Tracker>>> {
        let player = if by_source_id {
            self.directory.resolve_by_id(identifier).await?
        } else {
            self.directory.resolve_by_name(identifier).await?
        };

        let Some(player) = player else {
            tracing::debug!(identifier, by_source_id, "lookup for unknown player");
            return Ok(None);
        };

        let tracker = match self.cache.lookup(player.id()) {
            Some(tracker) => tracker,
            None => {
                let loaded = self.cache.load(player.id()).await?;
                self.cache.cache_if_absent(loaded, player.online())
            }
        };

        self.publisher.publish(
            &self.config.lookup_subject,
            &LookupNotice {
                service_id: self.config.service_id.clone(),
                player_id: player.id().to_string(),
                body: tracker.snapshot(true),
            },
        );

        Ok(Some(tracker))
    }

    /// The cached tracker for a player. Never loads.
    pub fn lookup(&self, id: &str) -> Option<Arc<Tracker>> {
        self.cache.lookup(id)
    }

    /// The cached tracker, or a freshly loaded, uncached one.
    pub async fn load(&self, id: &str) -> Result<Arc<Tracker>> {
        self.cache.load(id).await
    }

    /// Cache a tracker, arming a TTL unless `keep_alive` is set and the
    /// player is online.
    pub fn cache(&self, tracker: Arc<Tracker>, keep_alive: bool) {
        self.cache.cache(tracker, keep_alive);
    }

    /// Whether a TTL is pending for the player.
    pub fn is_scheduled(&self, id: &str) -> bool {
        self.timers.is_armed(id)
    }

    /// Number of cached trackers.
    pub fn cached_count(&self) -> usize {
        self.cache.len()
    }

    pub(crate) fn directory(&self) -> &dyn Directory {
        self.directory.as_ref()
    }

    pub(crate) fn tracker_cache(&self) -> &TrackerCache {
        &self.cache
    }
}

/// Builder for [`GrantService`].
pub struct GrantServiceBuilder {
    config: ServiceConfig,
    store: Option<Arc<dyn GrantStore>>,
    directory: Option<Arc<dyn Directory>>,
    bus: Option<Arc<dyn MessageBus>>,
}

impl GrantServiceBuilder {
    fn new(config: ServiceConfig) -> Self {
        Self {
            config,
            store: None,
            directory: None,
            bus: None,
        }
    }

    pub fn store(mut self, store: Arc<dyn GrantStore>) -> Self {
        self.store = Some(store);
        self
    }

    pub fn directory(mut self, directory: Arc<dyn Directory>) -> Self {
        self.directory = Some(directory);
        self
    }

    pub fn bus(mut self, bus: Arc<dyn MessageBus>) -> Self {
        self.bus = Some(bus);
        self
    }

    /// Wire the service together and start its background tasks.
    ///
    /// Registers the service for the directory's connectivity events.
    /// Must be called from within a Tokio runtime.
    pub fn build(self) -> Result<Arc<GrantService>> {
        let store = self.store.ok_or(GrantsError::NotConfigured("grant store"))?;
        let directory = self.directory.ok_or(GrantsError::NotConfigured("directory"))?;
        let bus = self.bus.ok_or(GrantsError::NotConfigured("message bus"))?;
        let config = self.config;

        let timers = Arc::new(KeyedTimerSet::new(config.ttl(), config.sweep_interval()));
        let map = TrackerMap::new();
        let eviction = EvictionCoordinator::new(timers.clone(), map.clone(), directory.clone());
        let cache = TrackerCache::new(map, store, eviction);
        let publisher = Publisher::spawn(bus, config.publish_buffer);
        timers.spawn_sweeper();

        tracing::info!(
            service_id = %config.service_id,
            ttl_secs = config.ttl_secs,
            "grant service started"
        );

        let service = Arc::new(GrantService {
            config,
            directory: directory.clone(),
            cache,
            timers,
            publisher,
        });
        directory.register_connectivity_handler(Arc::new(ConnectivityHooks::new(
            Arc::downgrade(&service),
        )));
        Ok(service)
    }
}
