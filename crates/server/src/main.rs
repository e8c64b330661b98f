//! lantern server entry point.
//!
//! Loads configuration, opens the cache database, starts the engine and
//! serves MCP on stdio. Logging goes to stderr to avoid interfering with the
//! JSON-RPC protocol on stdout.

use anyhow::{Context, Result};
use lantern_client::{Engine, FetchClient, FetchConfig};
use lantern_core::{AppConfig, CacheDb};
use rmcp::service::serve_server;
use rmcp::transport::io::stdio;
use std::sync::Arc;
use tracing_subscriber::EnvFilter;

mod error;
mod handler;
mod tools;

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_writer(std::io::stderr)
        .json()
        .init();

    let config = AppConfig::load().context("failed to load configuration")?;
    tracing::info!(origin = %config.origin, db_path = %config.db_path.display(), "starting lantern on stdio transport");

    let cache = CacheDb::open(&config.db_path)
        .await
        .with_context(|| format!("failed to open cache database at {}", config.db_path.display()))?;
    let transport = FetchClient::new(FetchConfig::from_app_config(&config)?)?;
    let engine = Engine::start(&config, Arc::new(cache.clone()), Arc::new(transport)).await?;

    let handler = handler::LanternServer::new(Arc::new(engine), cache);
    let server = serve_server(handler, stdio()).await?;

    server.waiting().await?;

    Ok(())
}
