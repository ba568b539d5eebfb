use std::sync::Arc;

use crate::config::Config;
use crate::session::store::SessionStore;

/// Shared application state injected into all route handlers via Axum extractors.
#[derive(Clone)]
pub struct AppState {
    /// Carries the page geometry every new session is created with.
    pub config: Config,
    /// Live document sessions. Default: InMemorySessionStore.
    pub sessions: Arc<dyn SessionStore>,
}
