//! Client stores and authority in one process, joined by an event bus.
//!
//! Run with: cargo run -p loopback

use std::sync::Arc;

use remote_store_core::EventBus;
use remote_store_server::{AnswerTarget, Authority, GameState, Visibility};
use remote_store_stores::{ConnectionStatus, Stores};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

fn main() -> anyhow::Result<()> {
    tracing_subscriber::registry()
        .with(tracing_subscriber::fmt::layer())
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "info".into()),
        )
        .init();

    let bus = Arc::new(EventBus::new());
    let stores = Stores::new(&bus)?;
    stores.is_gamemaster.set(true);

    let _title_log = stores
        .title
        .subscribe(|title| tracing::info!(%title, "title"));
    let _answers_log = stores.answers.subscribe(|answers| {
        let shown: Vec<&str> = answers
            .iter()
            .filter(|a| a.shown)
            .map(|a| a.text.as_str())
            .collect();
        tracing::info!(?shown, "answers");
    });

    stores.set_connection_status(ConnectionStatus::Connecting);
    let authority = Arc::new(Authority::new(GameState::new("Name something yellow")));
    authority.bridge(&bus);
    stores.set_connection_status(ConnectionStatus::Connected);

    stores.title.set("Name something blue".to_string())?;
    authority.set_visibility(Visibility::Show, AnswerTarget::Index(1))?;
    authority.set_visibility(Visibility::Hide, AnswerTarget::All)?;

    if let Err(e) = stores.answers.update(|answers| answers.clear()) {
        tracing::info!("{e}");
    }

    Ok(())
}
