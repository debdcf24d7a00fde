use anyhow::Context;
use clap::Parser;
use spotify_mcp_rust::config::Config;
use spotify_mcp_rust::router::create_app_router;
use spotify_mcp_rust::state::AppState;
use std::sync::Arc;
use tracing::info;
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    let config = Config::parse();

    // Initialize application state
    let state = Arc::new(AppState::from_config(&config).context("failed to initialize server state")?);

    // Build application router with all routes and middleware
    let app = create_app_router(state);

    // Configure the server address
    let addr = config.bind_addr();
    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .with_context(|| format!("failed to bind {addr}"))?;
    info!(%addr, server = %config.server_name, "MCP server listening");

    // Start the server
    axum::serve(listener, app).await.context("server error")?;
    Ok(())
}
