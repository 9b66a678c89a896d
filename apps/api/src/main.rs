mod catalog;
mod config;
mod errors;
mod guidance;
mod llm_client;
mod resume;
mod routes;
mod search_client;
mod session;
mod state;
#[cfg(test)]
mod test_support;

use anyhow::Result;
use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;
use tower_http::{cors::CorsLayer, trace::TraceLayer};
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use crate::config::Config;
use crate::llm_client::GeminiClient;
use crate::routes::build_router;
use crate::search_client::SerpApiClient;
use crate::session::store::SessionStore;
use crate::state::AppState;

const PURGE_INTERVAL: Duration = Duration::from_secs(60);

#[tokio::main]
async fn main() -> Result<()> {
    // Load configuration first (fails on malformed numeric settings)
    let config = Config::from_env()?;

    // Initialize structured logging
    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| {
            EnvFilter::new(format!("{}={}", env!("CARGO_CRATE_NAME"), &config.rust_log))
        }))
        .with(tracing_subscriber::fmt::layer())
        .init();

    info!("Starting Career API v{}", env!("CARGO_PKG_VERSION"));
    config.warn_missing_keys();

    let llm = GeminiClient::new()?;
    info!("LLM client initialized (model: {})", llm_client::MODEL);
    let search = SerpApiClient::new()?;

    let state = AppState::new(config.clone(), Arc::new(llm), Arc::new(search));
    info!(
        "Session store ready (max {} turns, {} min idle TTL)",
        config.max_session_turns, config.session_ttl_minutes
    );
    spawn_session_purger(state.sessions.clone());

    // Build router
    let app = build_router(state)
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive());

    let addr: SocketAddr = format!("0.0.0.0:{}", config.port).parse()?;
    info!("Listening on {addr}");

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}

/// Drops idle sessions in the background.
fn spawn_session_purger(sessions: SessionStore) {
    tokio::spawn(async move {
        let mut ticker = tokio::time::interval(PURGE_INTERVAL);
        loop {
            ticker.tick().await;
            let purged = sessions.purge_expired(chrono::Utc::now()).await;
            if purged > 0 {
                info!(
                    "Purged {purged} idle sessions ({} live)",
                    sessions.live_count().await
                );
            }
        }
    });
}
