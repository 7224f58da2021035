//! `docsync-server`: serves documents over HTTP

use anyhow::{Context, Result};
use clap::Parser;
use docsync_api::{router, AppState, ServerConfig};
use docsync_engine::MutationEngine;
use docsync_storage::open_store;
use tracing::info;
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    let config = ServerConfig::parse();

    let store = open_store(&config.store_config())
        .await
        .context("failed to open document store")?;
    let engine = MutationEngine::with_config(store, config.engine_config());
    let sequences: Vec<String> = engine
        .config()
        .sequences
        .iter()
        .map(ToString::to_string)
        .collect();
    info!(?sequences, "Mutation engine ready");

    let app = router(AppState::new(engine).with_max_body_bytes(config.max_body_bytes));

    let listener = tokio::net::TcpListener::bind(config.addr)
        .await
        .with_context(|| format!("failed to bind {}", config.addr))?;
    info!(addr = %config.addr, "docsync server listening");

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("server error")?;
    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::warn!(error = %e, "Failed to listen for shutdown signal");
        std::future::pending::<()>().await;
    }
    info!("Shutting down");
}
