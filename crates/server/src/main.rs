//! replay server entry point.
//!
//! This is the main binary that boots the MCP server on stdio transport.
//! Logging goes to stderr to avoid interfering with the JSON-RPC protocol on stdout.

use std::sync::Arc;

use anyhow::Result;
use replay_client::{CachingInterceptor, FetchConfig, ReqwestHandler};
use replay_core::cache::snapshots::read_snapshot_file;
use replay_core::{AppConfig, CacheEntry, HttpCacheStore};
use rmcp::service::serve_server;
use rmcp::transport::io::stdio;
use tokio::sync::Mutex;
use tracing_subscriber::EnvFilter;

mod handler;
mod tools;

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_writer(std::io::stderr)
        .json()
        .init();

    let config = AppConfig::load()?;
    tracing::info!(
        enable_interceptor = config.enable_interceptor,
        param_matching = ?config.param_matching,
        "Starting replay server on stdio transport"
    );

    let mut store = HttpCacheStore::with_entries(config.cache_settings(), preload(&config).await);
    store.subscribe(|event| tracing::debug!(?event, "cache store changed"));

    let handler = ReqwestHandler::new(FetchConfig::from_app_config(&config))?;
    let interceptor = CachingInterceptor::new(Arc::new(Mutex::new(store)), handler);

    let server = serve_server(handler::ReplayServer::new(interceptor, config), stdio()).await?;

    server.waiting().await?;

    Ok(())
}

/// Entries from the configured snapshot file; an unreadable snapshot starts the cache empty.
async fn preload(config: &AppConfig) -> Vec<CacheEntry> {
    let Some(path) = &config.snapshot_path else {
        return Vec::new();
    };

    match read_snapshot_file(path).await {
        Ok(entries) => {
            tracing::info!(path = %path.display(), entries = entries.len(), "preloaded HTTP cache");
            entries
        }
        Err(e) => {
            tracing::warn!(path = %path.display(), error = %e, "failed to preload snapshot, starting empty");
            Vec::new()
        }
    }
}
