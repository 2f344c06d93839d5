//! Connectivity-driven cache invalidation.

use std::sync::{Arc, Weak};

use async_trait::async_trait;

use crate::directory::ConnectivityHandler;
use crate::error::{GrantsError, Result};
use crate::service::GrantService;

/// Directory event handler that keeps the tracker cache in step with
/// player connectivity.
///
/// Holds the service weakly; events arriving after the service is gone
/// fail with [`GrantsError::ServiceNotReady`].
pub struct ConnectivityHooks {
    service: Weak<GrantService>,
}

impl ConnectivityHooks {
    pub fn new(service: Weak<GrantService>) -> Self {
        Self { service }
    }

    fn service(&self) -> Result<Arc<GrantService>> {
        self.service.upgrade().ok_or(GrantsError::ServiceNotReady)
    }
}

#[async_trait]
impl ConnectivityHandler for ConnectivityHooks {
    /// A connected player's tracker must not expire, whether or not one is
    /// cached yet.
    async fn on_connect(&self, id: &str) -> Result<()> {
        let service = self.service()?;
        service.tracker_cache().cancel_ttl(id);
        Ok(())
    }

    /// Drop the player's tracker right away rather than waiting for its TTL.
    async fn on_disconnect(&self, id: &str) -> Result<()> {
        let service = self.service()?;
        let player = service
            .directory()
            .cached_by_id(id)
            .ok_or_else(|| GrantsError::NoSuchPlayer(id.to_string()))?;

        let cache = service.tracker_cache();
        if cache.evict(player.id()).is_some() {
            tracing::info!(player_id = player.id(), "player disconnected, dropped tracker");
        }
        cache.cancel_ttl(player.id());
        Ok(())
    }
}
