use anyhow::{Context, Result};
use std::net::SocketAddr;
use std::sync::Arc;
use tracing_subscriber::EnvFilter;

use academic_assistant::config::Config;
use academic_assistant::handlers;
use academic_assistant::service_from_config;

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();

    // Load configuration
    let config = Arc::new(Config::load());

    let bind: SocketAddr = config
        .server
        .bind
        .parse()
        .with_context(|| format!("Invalid server.bind '{}' (expected host:port)", config.server.bind))?;

    let service = service_from_config(config.clone())?;
    let provider = service.provider_name();
    let router = handlers::router(service);

    let listener = tokio::net::TcpListener::bind(bind).await?;
    tracing::info!(
        %bind,
        route = %config.server.route,
        provider,
        model = %config.provider.model,
        "Starting academic assistant HTTP server"
    );

    axum::serve(listener, router)
        .with_graceful_shutdown(shutdown_signal())
        .await?;
    tracing::info!("Server shut down");
    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!("Failed to listen for shutdown signal: {}", e);
        std::future::pending::<()>().await;
    }
}
