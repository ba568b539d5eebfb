use axum::{extract::State, Json};
use serde_json::{json, Value};

use crate::state::AppState;

/// GET /health
/// Returns service status, version and the number of live sessions.
pub async fn health_handler(State(state): State<AppState>) -> Json<Value> {
    Json(json!({
        "status": "ok",
        "version": env!("CARGO_PKG_VERSION"),
        "service": "pager",
        "sessions": state.sessions.len().await,
        "page": {
            "width": state.config.page.page_width,
            "height": state.config.page.page_height,
        }
    }))
}
