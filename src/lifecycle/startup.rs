//! Startup orchestration.
//!
//! Order: logging, metrics, policy store, listener, server. Any error is fatal.

use std::path::Path;
use std::sync::Arc;

use thiserror::Error;
use tokio::net::TcpListener;

use crate::config::ServerConfig;
use crate::http::HttpServer;
use crate::lifecycle::Shutdown;
use crate::observability::metrics;
use crate::policy::{PolicyError, PolicyStore};

#[derive(Debug, Error)]
pub enum StartupError {
    #[error("failed to load booking policy: {0}")]
    Policy(#[from] PolicyError),

    #[error("server I/O error: {0}")]
    Io(#[from] std::io::Error),
}

pub fn open_policy_store(config: &ServerConfig) -> Result<PolicyStore, PolicyError> {
    match config.storage.config_path.as_deref() {
        Some(path) => PolicyStore::load_from_file(Path::new(path)),
        None => {
            tracing::info!("No storage.config_path set, booking policy is kept in memory");
            Ok(PolicyStore::new())
        }
    }
}

/// Bring every subsystem up and serve until shutdown.
pub async fn start(config: ServerConfig) -> Result<(), StartupError> {
    tracing::info!(
        bind_address = %config.listener.bind_address,
        request_timeout_secs = config.timeouts.request_secs,
        "Configuration loaded"
    );

    if config.observability.metrics_enabled {
        match config.observability.metrics_address.parse() {
            Ok(addr) => metrics::init_metrics(addr),
            Err(_) => tracing::error!(
                metrics_address = %config.observability.metrics_address,
                "Failed to parse metrics address"
            ),
        }
    }

    let policy = Arc::new(open_policy_store(&config)?);
    metrics::record_config_version(policy.get().version);

    let listener = TcpListener::bind(&config.listener.bind_address).await?;
    tracing::info!(address = %listener.local_addr()?, "Listening for connections");

    let shutdown = Shutdown::new();
    let server = HttpServer::new(config, policy);
    server.run(listener, shutdown.subscribe()).await?;

    tracing::info!("Shutdown complete");
    Ok(())
}
