//! Grantkeeper daemon.
//!
//! Serves grant lookups over HTTP from a SQLite grant database, for the
//! players listed in the config file.
//!
//! Usage: `grantkeeperd [config.json]`

use std::sync::Arc;

use anyhow::Context;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use grantkeeper::{http, DaemonConfig, GrantService, MemoryDirectory};
use grantkeeper_bus::MemoryBus;
use grantkeeper_store::SqliteStore;

fn load_config() -> anyhow::Result<DaemonConfig> {
    match std::env::args().nth(1) {
        Some(path) => {
            let raw = std::fs::read_to_string(&path)
                .with_context(|| format!("reading config file {path}"))?;
            serde_json::from_str(&raw).with_context(|| format!("parsing config file {path}"))
        }
        None => Ok(DaemonConfig::default()),
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .with(tracing_subscriber::fmt::layer())
        .init();

    let config = load_config()?;

    let store = SqliteStore::open(&config.database_path)
        .with_context(|| format!("opening grant database {}", config.database_path))?;

    // Only configured players resolve; everyone else is unknown.
    let directory = Arc::new(MemoryDirectory::with_players(config.players.clone()));
    tracing::info!(players = config.players.len(), "directory seeded");

    let service = GrantService::builder(config.service.clone())
        .store(Arc::new(store))
        .directory(directory)
        .bus(Arc::new(MemoryBus::new()))
        .build()?;

    let listener = tokio::net::TcpListener::bind(&config.listen_addr)
        .await
        .with_context(|| format!("binding {}", config.listen_addr))?;
    tracing::info!(addr = %config.listen_addr, "listening");

    axum::serve(listener, http::router(service))
        .with_graceful_shutdown(async {
            let _ = tokio::signal::ctrl_c().await;
            tracing::info!("shutting down");
        })
        .await?;

    Ok(())
}
