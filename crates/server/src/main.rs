//! swcache server entry point.
//!
//! Boots the caching worker for the configured scope and serves it as an MCP
//! server on stdio transport.
//! Logging goes to stderr to avoid interfering with the JSON-RPC protocol on stdout.

use std::sync::Arc;

use anyhow::{Context, Result};
use rmcp::service::serve_server;
use rmcp::transport::io::stdio;
use swcache_client::{Connectivity, FetchClient, FetchConfig, GatedNetwork};
use swcache_core::{AppConfig, CacheDb};
use tracing_subscriber::EnvFilter;

mod error;
mod handler;
mod state;
mod tools;

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_writer(std::io::stderr)
        .json()
        .init();

    let config = AppConfig::load().context("loading configuration")?;
    tracing::info!(
        scope = %config.scope,
        version = %config.cache_version,
        db_path = %config.db_path.display(),
        "Starting swcache server on stdio transport"
    );

    let storage = CacheDb::open(&config.db_path)
        .await
        .with_context(|| format!("opening cache database {}", config.db_path.display()))?;
    let connectivity = Connectivity::default();
    let network = GatedNetwork::new(FetchClient::new(FetchConfig::from(&config))?, connectivity.clone());

    let state = state::AppState::new(config, Arc::new(storage), Arc::new(network), connectivity)?;
    let _event_log = state.spawn_event_log();

    if let Err(e) = state.registration.update(&state.config.cache_version).await {
        tracing::warn!(error = %e, "initial install failed; serving uncontrolled until worker_update succeeds");
    }

    let handler = handler::McpSwServer::new(Arc::new(state));
    let transport = stdio();
    let server = serve_server(handler, transport).await?;

    server.waiting().await?;

    Ok(())
}
