//! Tracker cache and loader.
//!
//! [`TrackerCache::lookup`] only consults the cache, [`TrackerCache::load`]
//! goes to the store on a miss without caching the result, and the caller
//! decides the caching policy with [`TrackerCache::cache`] or
//! [`TrackerCache::cache_if_absent`] once it knows whether the player is
//! online.

use std::collections::hash_map::Entry;
use std::collections::HashMap;
use std::sync::{Arc, PoisonError, RwLock};

use grantkeeper_core::{GrantInfo, Timestamp, Tracker};
use grantkeeper_store::{Filter, GrantStore};

use crate::error::Result;
use crate::eviction::EvictionCoordinator;

/// Shared map of cached trackers, keyed by player ID.
///
/// Clones share the same map.
#[derive(Clone, Default)]
pub struct TrackerMap {
    inner: Arc<RwLock<HashMap<String, Arc<Tracker>>>>,
}

impl TrackerMap {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self, id: &str) -> Option<Arc<Tracker>> {
        self.inner
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .get(id)
            .cloned()
    }

    /// Insert or overwrite, returning the previous tracker.
    pub fn insert(&self, tracker: Arc<Tracker>) -> Option<Arc<Tracker>> {
        self.inner
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .insert(tracker.id().to_string(), tracker)
    }

    /// Insert unless a tracker is already cached for the same player.
    ///
    /// Returns the tracker now cached and whether it is the one passed in.
    pub fn insert_if_absent(&self, tracker: Arc<Tracker>) -> (Arc<Tracker>, bool) {
        let mut map = self.inner.write().unwrap_or_else(PoisonError::into_inner);
        match map.entry(tracker.id().to_string()) {
            Entry::Occupied(existing) => (existing.get().clone(), false),
            Entry::Vacant(slot) => (slot.insert(tracker).clone(), true),
        }
    }

    pub fn remove(&self, id: &str) -> Option<Arc<Tracker>> {
        self.inner
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .remove(id)
    }

    pub fn len(&self) -> usize {
        self.inner.read().unwrap_or_else(PoisonError::into_inner).len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// Cache of player trackers over a grant store.
pub struct TrackerCache {
    map: TrackerMap,
    store: Arc<dyn GrantStore>,
    eviction: EvictionCoordinator,
}

impl TrackerCache {
    pub fn new(map: TrackerMap, store: Arc<dyn GrantStore>, eviction: EvictionCoordinator) -> Self {
        Self {
            map,
            store,
            eviction,
        }
    }

    /// The cached tracker for a player, if any. Never loads.
    pub fn lookup(&self, id: &str) -> Option<Arc<Tracker>> {
        self.map.get(id)
    }

    /// The cached tracker, or a freshly loaded one that is not cached.
    ///
    /// A single malformed grant document fails the whole load.
    pub async fn load(&self, id: &str) -> Result<Arc<Tracker>> {
        if let Some(tracker) = self.lookup(id) {
            tracing::debug!(player_id = id, "tracker cache hit");
            return Ok(tracker);
        }

        // The map lock is not held here; the query may take a while.
        let cursor = self.store.find(&Filter::source_id(id)).await?;
        let mut grants = Vec::with_capacity(cursor.remaining());
        for doc in cursor {
            grants.push(GrantInfo::from_document(doc?)?);
        }

        let tracker = Tracker::from_grants(id, grants, Timestamp::now());
        tracing::debug!(
            player_id = id,
            actives = tracker.actives().len(),
            expired = tracker.expired().len(),
            "loaded tracker"
        );
        Ok(Arc::new(tracker))
    }

    /// Cache a tracker, replacing any existing one.
    ///
    /// Without `keep_alive` the entry gets a TTL. With it, any pending TTL
    /// is cancelled and the entry stays until explicitly evicted, provided
    /// the player is still online once the entry is in place.
    pub fn cache(&self, tracker: Arc<Tracker>, keep_alive: bool) {
        let id = tracker.id().to_string();
        self.map.insert(tracker);
        self.apply_ttl(&id, keep_alive);
    }

    /// Cache a tracker unless one is already cached for the player.
    ///
    /// The check and the insert happen under one lock, so concurrent
    /// first-time loads agree on a single tracker and arm a single TTL.
    /// Returns whichever tracker ends up cached.
    pub fn cache_if_absent(&self, tracker: Arc<Tracker>, keep_alive: bool) -> Arc<Tracker> {
        let (cached, inserted) = self.map.insert_if_absent(tracker);
        if inserted {
            self.apply_ttl(cached.id(), keep_alive);
        } else {
            tracing::debug!(player_id = cached.id(), "tracker already cached, discarding load");
        }
        cached
    }

    /// Drop a player's tracker from the cache. Pending TTLs are left alone.
    pub fn evict(&self, id: &str) -> Option<Arc<Tracker>> {
        self.map.remove(id)
    }

    /// Cancel any pending TTL for a player.
    pub fn cancel_ttl(&self, id: &str) {
        self.eviction.cancel(id);
    }

    /// Number of cached trackers.
    pub fn len(&self) -> usize {
        self.map.len()
    }

    pub fn is_empty(&self) -> bool {
        self.map.is_empty()
    }

    fn apply_ttl(&self, id: &str, keep_alive: bool) {
        if keep_alive {
            self.eviction.keep_alive(id);
        } else {
            self.eviction.schedule(id);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::directory::{MemoryDirectory, PlayerInfo};
    use crate::error::GrantsError;
    use crate::timer::KeyedTimerSet;
    use grantkeeper_store::{Document, MemoryStore};
    use serde_json::json;
    use std::time::Duration;

    struct Fixture {
        store: Arc<MemoryStore>,
        timers: Arc<KeyedTimerSet>,
        directory: Arc<MemoryDirectory>,
        cache: TrackerCache,
    }

    fn fixture() -> Fixture {
        let store = Arc::new(MemoryStore::new());
        let timers = Arc::new(KeyedTimerSet::new(
            Duration::from_secs(60),
            Duration::from_secs(60),
        ));
        let map = TrackerMap::new();
        let directory = Arc::new(MemoryDirectory::new());
        let eviction = EvictionCoordinator::new(timers.clone(), map.clone(), directory.clone());
        let cache = TrackerCache::new(map, store.clone(), eviction);
        Fixture {
            store,
            timers,
            directory,
            cache,
        }
    }

    fn doc(value: serde_json::Value) -> Document {
        match value {
            serde_json::Value::Object(map) => map,
            _ => panic!("not an object"),
        }
    }

    fn grant_doc(id: &str, source: &str, expires_at: i64) -> Document {
        doc(json!({
            "_id": id,
            "source_id": source,
            "grant": {"key": "rank", "value": "vip"},
            "added_by": "console",
            "added_at": 100,
            "expires_at": expires_at,
            "scopes": ["global"],
        }))
    }

    #[tokio::test]
    async fn test_load_partitions_and_does_not_cache() {
        let f = fixture();
        f.store.insert(grant_doc("g1", "p1", 0));
        f.store.insert(grant_doc("g2", "p1", 1));
        f.store.insert(grant_doc("g3", "p2", 0));

        let tracker = f.cache.load("p1").await.unwrap();
        assert_eq!(tracker.actives().len(), 1);
        assert_eq!(tracker.actives()[0].id(), "g1");
        assert_eq!(tracker.expired().len(), 1);
        assert_eq!(tracker.expired()[0].id(), "g2");

        assert!(f.cache.lookup("p1").is_none());
        assert!(f.cache.is_empty());
    }

    #[tokio::test]
    async fn test_load_returns_cached_without_query() {
        let f = fixture();
        let tracker = Arc::new(Tracker::new("p1"));
        f.cache.cache(tracker.clone(), true);

        let loaded = f.cache.load("p1").await.unwrap();
        assert!(Arc::ptr_eq(&loaded, &tracker));
        assert_eq!(f.store.query_count(), 0);
    }

    #[tokio::test]
    async fn test_load_fails_on_malformed_document() {
        let f = fixture();
        f.store.insert(grant_doc("g1", "p1", 0));
        f.store.insert(doc(json!({"_id": "bad", "source_id": "p1", "grant": "oops"})));

        assert!(matches!(
            f.cache.load("p1").await,
            Err(GrantsError::DecodeFailed(_))
        ));
    }

    #[tokio::test]
    async fn test_load_store_unavailable() {
        let f = fixture();
        f.store.close();

        assert!(matches!(
            f.cache.load("p1").await,
            Err(GrantsError::StoreUnavailable)
        ));
    }

    #[tokio::test]
    async fn test_cache_ttl_policy() {
        let f = fixture();
        f.directory.insert(PlayerInfo::new("online", "Alice", true));

        f.cache.cache(Arc::new(Tracker::new("online")), false);
        assert!(f.timers.is_armed("online"));

        // Keeping an entry alive cancels its earlier TTL.
        f.cache.cache(Arc::new(Tracker::new("online")), true);
        assert!(!f.timers.is_armed("online"));

        f.cache.cache(Arc::new(Tracker::new("offline")), false);
        assert!(f.timers.is_armed("offline"));
        assert_eq!(f.cache.len(), 2);
    }

    #[tokio::test]
    async fn test_keep_alive_for_offline_player_still_gets_ttl() {
        let f = fixture();
        f.directory.insert(PlayerInfo::new("p1", "Alice", false));

        f.cache.cache(Arc::new(Tracker::new("p1")), true);
        assert!(f.timers.is_armed("p1"));

        f.cache.cache_if_absent(Arc::new(Tracker::new("p2")), true);
        assert!(f.timers.is_armed("p2"));
    }

    #[tokio::test]
    async fn test_cache_overwrites() {
        let f = fixture();
        let first = Arc::new(Tracker::new("p1"));
        let second = Arc::new(Tracker::new("p1"));

        f.cache.cache(first, true);
        f.cache.cache(second.clone(), true);
        assert!(Arc::ptr_eq(&f.cache.lookup("p1").unwrap(), &second));
    }

    #[tokio::test]
    async fn test_cache_if_absent_keeps_first() {
        let f = fixture();
        let first = Arc::new(Tracker::new("p1"));
        let second = Arc::new(Tracker::new("p1"));

        let a = f.cache.cache_if_absent(first.clone(), false);
        let b = f.cache.cache_if_absent(second, false);

        assert!(Arc::ptr_eq(&a, &first));
        assert!(Arc::ptr_eq(&b, &first));
        assert_eq!(f.timers.len(), 1);
    }

    #[tokio::test]
    async fn test_evict_leaves_ttl() {
        let f = fixture();
        f.cache.cache(Arc::new(Tracker::new("p1")), false);

        assert!(f.cache.evict("p1").is_some());
        assert!(f.cache.evict("p1").is_none());
        assert!(f.timers.is_armed("p1"));

        f.cache.cancel_ttl("p1");
        assert!(!f.timers.is_armed("p1"));
    }
}
