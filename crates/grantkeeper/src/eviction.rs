//! TTL-driven eviction of cached trackers.

use std::sync::Arc;

use crate::cache::TrackerMap;
use crate::directory::Directory;
use crate::timer::{ExpireReason, ExpiryTimer};

/// Arms and cancels per-player TTLs and evicts trackers when they expire.
///
/// An expiry never evicts a player the directory reports as online: a
/// timer that fires just after a reconnect is a no-op.
pub struct EvictionCoordinator {
    timer: Arc<dyn ExpiryTimer>,
    directory: Arc<dyn Directory>,
}

impl EvictionCoordinator {
    /// Install the eviction callback on `timer`.
    pub fn new(timer: Arc<dyn ExpiryTimer>, map: TrackerMap, directory: Arc<dyn Directory>) -> Self {
        let lookup = directory.clone();
        timer.set_expire_callback(Arc::new(move |id: &str, reason: ExpireReason| {
            on_expire(&map, lookup.as_ref(), id, reason);
        }));
        Self { timer, directory }
    }

    /// Start (or restart) the TTL for a player.
    pub fn schedule(&self, id: &str) {
        self.timer.arm(id);
    }

    /// Stop the TTL for a player, if one is running.
    pub fn cancel(&self, id: &str) {
        self.timer.cancel(id);
    }

    /// Keep a player's tracker cached without a TTL while they are online.
    ///
    /// Must be called after the tracker is in the map. A player who went
    /// offline in the meantime gets a TTL instead, since their disconnect
    /// may already have been handled.
    pub fn keep_alive(&self, id: &str) {
        self.timer.cancel(id);
        if !is_online(self.directory.as_ref(), id) {
            tracing::debug!(player_id = id, "player no longer online, arming ttl");
            self.timer.arm(id);
        }
    }
}

fn is_online(directory: &dyn Directory, id: &str) -> bool {
    directory.cached_by_id(id).is_some_and(|p| p.online())
}

fn on_expire(map: &TrackerMap, directory: &dyn Directory, id: &str, reason: ExpireReason) {
    if reason == ExpireReason::Manual {
        return;
    }

    if is_online(directory, id) {
        tracing::debug!(player_id = id, "ttl expired for online player, keeping tracker");
        return;
    }

    if map.remove(id).is_some() {
        tracing::debug!(player_id = id, "evicted tracker after ttl");
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::directory::{MemoryDirectory, PlayerInfo};
    use crate::timer::KeyedTimerSet;
    use grantkeeper_core::Tracker;
    use std::time::Duration;

    fn setup() -> (Arc<KeyedTimerSet>, TrackerMap, Arc<MemoryDirectory>, EvictionCoordinator) {
        let timers = Arc::new(KeyedTimerSet::new(
            Duration::from_secs(10),
            Duration::from_secs(1),
        ));
        let map = TrackerMap::new();
        let directory = Arc::new(MemoryDirectory::new());
        let coordinator = EvictionCoordinator::new(timers.clone(), map.clone(), directory.clone());
        (timers, map, directory, coordinator)
    }

    #[tokio::test(start_paused = true)]
    async fn test_expiry_evicts_offline_player() {
        let (timers, map, directory, coordinator) = setup();
        directory.insert(PlayerInfo::new("p1", "Alice", false));
        map.insert(Arc::new(Tracker::new("p1")));

        coordinator.schedule("p1");
        tokio::time::advance(Duration::from_secs(10)).await;
        timers.sweep();

        assert!(map.get("p1").is_none());
    }

    #[tokio::test(start_paused = true)]
    async fn test_expiry_keeps_online_player() {
        let (timers, map, directory, coordinator) = setup();
        directory.insert(PlayerInfo::new("p1", "Alice", true));
        map.insert(Arc::new(Tracker::new("p1")));

        coordinator.schedule("p1");
        tokio::time::advance(Duration::from_secs(10)).await;
        timers.sweep();

        assert!(map.get("p1").is_some());
    }

    #[tokio::test]
    async fn test_manual_cancel_keeps_tracker() {
        let (timers, map, _directory, coordinator) = setup();
        map.insert(Arc::new(Tracker::new("p1")));

        coordinator.schedule("p1");
        coordinator.cancel("p1");

        assert!(!timers.is_armed("p1"));
        assert!(map.get("p1").is_some());
    }

    #[tokio::test]
    async fn test_keep_alive_online_player() {
        let (timers, map, directory, coordinator) = setup();
        directory.insert(PlayerInfo::new("p1", "Alice", true));
        map.insert(Arc::new(Tracker::new("p1")));

        coordinator.schedule("p1");
        coordinator.keep_alive("p1");
        assert!(!timers.is_armed("p1"));
    }

    #[tokio::test(start_paused = true)]
    async fn test_keep_alive_arms_ttl_for_offline_player() {
        let (timers, map, directory, coordinator) = setup();
        directory.insert(PlayerInfo::new("p1", "Alice", false));
        map.insert(Arc::new(Tracker::new("p1")));

        coordinator.keep_alive("p1");
        assert!(timers.is_armed("p1"));

        tokio::time::advance(Duration::from_secs(10)).await;
        timers.sweep();
        assert!(map.get("p1").is_none());
    }

    #[tokio::test(start_paused = true)]
    async fn test_unknown_player_is_evicted() {
        let (timers, map, _directory, coordinator) = setup();
        map.insert(Arc::new(Tracker::new("ghost")));

        coordinator.schedule("ghost");
        tokio::time::advance(Duration::from_secs(10)).await;
        timers.sweep();

        assert!(map.is_empty());
    }
}
