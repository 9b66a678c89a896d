use std::sync::Arc;

use crate::config::Config;
use crate::llm_client::CompletionProvider;
use crate::search_client::SearchProvider;
use crate::session::store::SessionStore;

/// Shared application state injected into all route handlers via Axum extractors.
#[derive(Clone)]
pub struct AppState {
    pub config: Config,
    pub sessions: SessionStore,
    /// Gemini in production; swapped for an in-process fake in tests.
    pub llm: Arc<dyn CompletionProvider>,
    pub search: Arc<dyn SearchProvider>,
}

impl AppState {
    pub fn new(
        config: Config,
        llm: Arc<dyn CompletionProvider>,
        search: Arc<dyn SearchProvider>,
    ) -> Self {
        let sessions = SessionStore::new(config.max_session_turns, config.session_ttl_minutes);
        Self {
            config,
            sessions,
            llm,
            search,
        }
    }
}
