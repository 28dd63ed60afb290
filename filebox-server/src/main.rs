mod config;
mod handlers;
mod routes;
mod state;

use std::path::PathBuf;
use std::sync::Arc;

use anyhow::Context;
use tower_http::trace::TraceLayer;
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

use filebox_common::DirectoryStore;

use config::ServerConfig;
use state::AppState;

const DEFAULT_CONFIG_PATH: &str = "filebox.toml";

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env().add_directive("info".parse()?))
        .init();

    info!("filebox-server starting");

    // Explicit path wins; otherwise pick up ./filebox.toml if present
    let config_path = std::env::args().nth(1).map(PathBuf::from).or_else(|| {
        let default = PathBuf::from(DEFAULT_CONFIG_PATH);
        default.exists().then_some(default)
    });
    let config = ServerConfig::load(config_path.as_deref())?;

    std::fs::create_dir_all(&config.base_dir).with_context(|| {
        format!("Failed to create base directory {}", config.base_dir.display())
    })?;
    info!(base_dir = %config.base_dir.display(), "Base directory ready");

    let store = DirectoryStore::new(&config.base_dir)
        .with_extension_fallback(config.sniff_extension_fallback);
    let base_dir = store.base_path().to_path_buf();
    let state = Arc::new(AppState::new(Arc::new(store), base_dir));

    let app = routes::build_router(state, config.max_upload_bytes).layer(TraceLayer::new_for_http());

    let addr = config.socket_addr()?;
    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .with_context(|| format!("Failed to bind {}", addr))?;
    info!(%addr, "Listening on http://{}", addr);

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    info!("filebox-server stopped");
    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        warn!(error = %e, "Failed to install Ctrl+C handler");
        std::future::pending::<()>().await;
    }
    info!("Received shutdown signal");
}
