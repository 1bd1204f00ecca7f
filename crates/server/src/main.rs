//! refill-mcp server entry point.
//!
//! Boots the daily reader as an MCP server on stdio transport.
//! Logging goes to stderr to avoid interfering with the JSON-RPC protocol on stdout.

use std::sync::Arc;

use anyhow::Result;
use refill_core::{AppConfig, CONTENT_VERSION, SqliteStore};
use rmcp::service::serve_server;
use rmcp::transport::io::stdio;
use tracing_subscriber::EnvFilter;

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

    let config = AppConfig::load()?;
    let store = SqliteStore::open(&config.db_path).await?;
    let source = refill_client::source_from_config(&config)?;

    tracing::info!(db = %config.db_path.display(), source = source.name(), "starting refill-mcp on stdio transport");

    let state = Arc::new(state::ReaderState::new(Arc::new(store), source, &config));
    let (sweep, invalidated) = state.startup(CONTENT_VERSION).await;
    tracing::info!(?sweep, invalidated, content_version = CONTENT_VERSION, "startup housekeeping done");

    let handler = handler::RefillServer::new(state);
    let transport = stdio();
    let server = serve_server(handler, transport).await?;

    server.waiting().await?;

    Ok(())
}
