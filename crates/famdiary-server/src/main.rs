//! famdiary session server binary.

use anyhow::{Context, Result};
use tokio::net::TcpListener;
use tracing::{error, info, warn};

use famdiary_server::{build_router, telemetry, AppState, ServerConfig};

#[tokio::main]
async fn main() -> Result<()> {
    // Load .env file if present (silently ignore if not found)
    let _ = dotenvy::dotenv();

    let config = ServerConfig::from_env().context("Invalid server configuration")?;

    let _log_guard = telemetry::init_tracing(config.log_dir.as_deref());
    info!(?config, "famdiary server starting");
    if config.uses_development_secret() {
        warn!("JWT_SECRET not set, using the development signing secret");
    }

    let app = build_router(AppState::from_config(&config));

    let listener = TcpListener::bind(config.bind)
        .await
        .with_context(|| format!("Failed to bind {}", config.bind))?;
    info!(addr = %listener.local_addr()?, "Listening");

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("Server error")?;

    info!("famdiary server shutting down");
    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        error!(error = %e, "Failed to listen for shutdown signal");
        std::future::pending::<()>().await;
    }
}
