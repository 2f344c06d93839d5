//! Service and daemon configuration.

use std::time::Duration;

use serde::Deserialize;

use grantkeeper_bus::LOOKUP_SUBJECT;

use crate::directory::PlayerInfo;

/// Configuration for a [`GrantService`](crate::GrantService).
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct ServiceConfig {
    /// Identity of this instance, stamped on lookup notices and error replies.
    pub service_id: String,
    /// How long an offline player's tracker stays cached.
    pub ttl_secs: u64,
    /// How often expired cache entries are swept.
    pub sweep_interval_secs: u64,
    /// Bus subject that lookup notices are published on.
    pub lookup_subject: String,
    /// Maximum notices queued for the publisher before new ones are dropped.
    pub publish_buffer: usize,
}

impl ServiceConfig {
    pub fn ttl(&self) -> Duration {
        Duration::from_secs(self.ttl_secs)
    }

    pub fn sweep_interval(&self) -> Duration {
        Duration::from_secs(self.sweep_interval_secs)
    }
}

impl Default for ServiceConfig {
    fn default() -> Self {
        Self {
            service_id: "grantkeeper".to_string(),
            ttl_secs: 3600,
            sweep_interval_secs: 3600,
            lookup_subject: LOOKUP_SUBJECT.to_string(),
            publish_buffer: 1024,
        }
    }
}

/// Configuration for the `grantkeeperd` daemon.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct DaemonConfig {
    /// Address the HTTP server binds to.
    pub listen_addr: String,
    /// Path of the SQLite grant database.
    pub database_path: String,
    pub service: ServiceConfig,
    /// Players the daemon's directory starts out knowing.
    pub players: Vec<PlayerInfo>,
}

impl Default for DaemonConfig {
    fn default() -> Self {
        Self {
            listen_addr: "0.0.0.0:8080".to_string(),
            database_path: "grants.db".to_string(),
            service: ServiceConfig::default(),
            players: Vec::new(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = ServiceConfig::default();
        assert_eq!(config.service_id, "grantkeeper");
        assert_eq!(config.ttl(), Duration::from_secs(3600));
        assert_eq!(config.sweep_interval(), Duration::from_secs(3600));
        assert_eq!(config.lookup_subject, "grants_lookup");
    }

    #[test]
    fn test_partial_json_keeps_defaults() {
        let config: DaemonConfig = serde_json::from_str(
            r#"{"listen_addr": "127.0.0.1:9000", "service": {"ttl_secs": 60}}"#,
        )
        .unwrap();

        assert_eq!(config.listen_addr, "127.0.0.1:9000");
        assert_eq!(config.database_path, "grants.db");
        assert_eq!(config.service.ttl_secs, 60);
        assert_eq!(config.service.service_id, "grantkeeper");
        assert_eq!(config.service.publish_buffer, 1024);
    }

    #[test]
    fn test_players_parsed() {
        let config: DaemonConfig = serde_json::from_str(
            r#"{"players": [{"id": "p1", "name": "Alice"}, {"id": "p2", "name": "Bob", "online": true}]}"#,
        )
        .unwrap();

        assert_eq!(
            config.players,
            vec![
                PlayerInfo::new("p1", "Alice", false),
                PlayerInfo::new("p2", "Bob", true),
            ]
        );
    }

    #[test]
    fn test_empty_json_is_default() {
        let config: DaemonConfig = serde_json::from_str("{}").unwrap();
        assert_eq!(config, DaemonConfig::default());
    }
}
