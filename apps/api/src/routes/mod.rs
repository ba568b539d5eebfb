pub mod health;

use axum::{
    routing::{get, post, put},
    Router,
};

use crate::session::handlers;
use crate::state::AppState;

pub fn build_router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(health::health_handler))
        .route("/api/v1/sessions", post(handlers::handle_create_session))
        .route(
            "/api/v1/sessions/:id",
            get(handlers::handle_get_session).delete(handlers::handle_delete_session),
        )
        .route("/api/v1/sessions/:id/tree", put(handlers::handle_replace_tree))
        .route("/api/v1/sessions/:id/mode", put(handlers::handle_set_mode))
        .route("/api/v1/sessions/:id/select", post(handlers::handle_select))
        .route("/api/v1/sessions/:id/click", post(handlers::handle_click))
        .route("/api/v1/sessions/:id/commands", post(handlers::handle_command))
        .route("/api/v1/sessions/:id/keys", post(handlers::handle_key))
        .with_state(state)
}
