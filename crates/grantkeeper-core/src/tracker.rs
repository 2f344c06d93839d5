//! Per-player grant trackers.
//!
//! A tracker holds every grant issuance loaded for one player, partitioned
//! into active and expired sets at load time. The two partitions have
//! independent reader/writer locks so readers of one never wait on writers
//! of the other.

use std::collections::BTreeMap;
use std::sync::{Arc, PoisonError, RwLock};

use serde::{Deserialize, Serialize};

use crate::info::GrantInfo;
use crate::time::Timestamp;

/// A player's active and expired grant issuances.
#[derive(Debug)]
pub struct Tracker {
    /// The player ID owning this tracker.
    id: String,

    actives: RwLock<Vec<Arc<GrantInfo>>>,

    expired: RwLock<Vec<GrantInfo>>,
}

impl Tracker {
    /// Create an empty tracker for a player.
    pub fn new(id: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            actives: RwLock::new(Vec::new()),
            expired: RwLock::new(Vec::new()),
        }
    }

    /// Build a tracker from loaded grant issuances, partitioning them by
    /// whether they are expired at `now`.
    pub fn from_grants(
        id: impl Into<String>,
        grants: impl IntoIterator<Item = GrantInfo>,
        now: Timestamp,
    ) -> Self {
        let tracker = Self::new(id);
        for gi in grants {
            if gi.is_expired_at(now) {
                tracker.add_expired(gi);
            } else {
                tracker.add_active(Arc::new(gi));
            }
        }
        tracker
    }

    /// The ID of the player who owns the tracker.
    pub fn id(&self) -> &str {
        &self.id
    }

    /// Snapshot of the active grant issuances.
    pub fn actives(&self) -> Vec<Arc<GrantInfo>> {
        self.actives
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    /// Snapshot of the expired grant issuances.
    pub fn expired(&self) -> Vec<GrantInfo> {
        self.expired
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    pub fn add_active(&self, gi: Arc<GrantInfo>) {
        self.actives
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .push(gi);
    }

    pub fn add_expired(&self, gi: GrantInfo) {
        self.expired
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .push(gi);
    }

    /// Remove the first active entry that is the same allocation as `gi`.
    ///
    /// Equal-valued but distinct entries are not removed. Returns whether an
    /// entry was removed.
    pub fn remove_active(&self, gi: &Arc<GrantInfo>) -> bool {
        let mut actives = self.actives.write().unwrap_or_else(PoisonError::into_inner);
        match actives.iter().position(|a| Arc::ptr_eq(a, gi)) {
            Some(idx) => {
                actives.remove(idx);
                true
            }
            None => false,
        }
    }

    /// Serializable view of this tracker, keyed by grant issuance ID.
    ///
    /// The expired map is left empty unless `include_expired` is set.
    pub fn snapshot(&self, include_expired: bool) -> TrackerSnapshot {
        let actives = self
            .actives()
            .iter()
            .map(|gi| (gi.id().to_string(), GrantInfo::clone(gi)))
            .collect();

        let expired = if include_expired {
            self.expired()
                .into_iter()
                .map(|gi| (gi.id().to_string(), gi))
                .collect()
        } else {
            BTreeMap::new()
        };

        TrackerSnapshot { actives, expired }
    }
}

/// A point-in-time view of a tracker.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TrackerSnapshot {
    pub actives: BTreeMap<String, GrantInfo>,
    pub expired: BTreeMap<String, GrantInfo>,
}
