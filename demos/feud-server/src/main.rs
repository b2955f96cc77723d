//! Quiz server: serves the authoritative stores over WebSocket.
//!
//! Run with: cargo run -p feud-server
//!
//! Set `FEUD_ADDR` to change the listen address and `FEUD_TITLE` for the
//! initial question.

use std::sync::Arc;

use anyhow::Context;
use remote_store_server::{Authority, GameState, ServerConfig, create_router};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::registry()
        .with(tracing_subscriber::fmt::layer())
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "info".into()),
        )
        .init();

    let config = ServerConfig::from_env()?;
    let authority = Arc::new(Authority::new(GameState::new(config.title.clone())));
    let app = create_router(authority);

    let listener = tokio::net::TcpListener::bind(config.addr)
        .await
        .with_context(|| format!("failed to bind {}", config.addr))?;
    tracing::info!("Server listening on http://{}", config.addr);
    tracing::info!("WebSocket endpoint: ws://{}/ws", config.addr);
    for command in ["show", "hide", "toggle"] {
        tracing::info!("  http://{}/{command}/<index|all>", config.addr);
    }

    axum::serve(listener, app).await?;
    Ok(())
}
