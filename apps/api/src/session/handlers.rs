//! Axum route handlers for the Session API.
//!
//! The renderer forwards measurements and input events here; every response carries
//! the freshly recomputed layout so the renderer never paints a stale state.

use axum::{
    extract::{Path, State},
    http::StatusCode,
    Json,
};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tracing::info;
use uuid::Uuid;

use crate::editor::{Interaction, KeyPress, OverrideEntry, SpacingCommand};
use crate::errors::AppError;
use crate::layout::{BlockKey, ContentTree, MarginSource, SectionPlacement};
use crate::session::coordinator::{DocumentSession, HitPath, ViewMode};
use crate::session::store::{SharedSession, StoredSession};
use crate::state::AppState;

// ────────────────────────────────────────────────────────────────────────────
// Request / Response types
// ────────────────────────────────────────────────────────────────────────────

#[derive(Debug, Deserialize)]
pub struct CreateSessionRequest {
    #[serde(default)]
    pub tree: ContentTree,
    #[serde(default)]
    pub view_mode: Option<ViewMode>,
    #[serde(default)]
    pub edit_mode: Option<bool>,
}

#[derive(Debug, Deserialize)]
pub struct ReplaceTreeRequest {
    pub tree: ContentTree,
}

#[derive(Debug, Deserialize)]
pub struct ModeRequest {
    #[serde(default)]
    pub view_mode: Option<ViewMode>,
    #[serde(default)]
    pub edit_mode: Option<bool>,
}

#[derive(Debug, Deserialize)]
pub struct SelectRequest {
    pub key: BlockKey,
}

#[derive(Debug, Deserialize)]
pub struct CommandRequest {
    pub command: SpacingCommand,
}

#[derive(Debug, Deserialize)]
pub struct KeyRequest {
    pub key: KeyPress,
}

#[derive(Debug, Clone, Serialize)]
pub struct BlockMargin {
    pub key: BlockKey,
    pub margin_top: f64,
}

/// Everything the renderer reads back after any change.
#[derive(Debug, Clone, Serialize)]
pub struct SessionSnapshot {
    pub session_id: Uuid,
    pub revision: u64,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    pub view_mode: ViewMode,
    pub edit_mode: bool,
    pub interaction: Interaction,
    pub is_selection_active: bool,
    pub margin_source: MarginSource,
    pub total_pages: usize,
    pub page_width: f64,
    pub page_height: f64,
    pub flowed_height: f64,
    pub page_breaks: Vec<f64>,
    pub margins: Vec<BlockMargin>,
    pub placements: Vec<SectionPlacement>,
    pub overrides: Vec<OverrideEntry>,
}

/// Response to an input event: whether it did anything, plus the current state.
#[derive(Debug, Serialize)]
pub struct ActionResponse {
    pub applied: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub command: Option<SpacingCommand>,
    pub session: SessionSnapshot,
}

// ────────────────────────────────────────────────────────────────────────────
// Handlers
// ────────────────────────────────────────────────────────────────────────────

/// POST /api/v1/sessions
///
/// Creates a document session from a measured tree. Starts in the edit view with
/// edit mode off unless the request says otherwise.
pub async fn handle_create_session(
    State(state): State<AppState>,
    Json(request): Json<CreateSessionRequest>,
) -> Result<(StatusCode, Json<SessionSnapshot>), AppError> {
    request
        .tree
        .validate(&state.config.page)
        .map_err(AppError::Validation)?;

    let section_count = request.tree.sections.len();
    let mut document = DocumentSession::new(request.tree, state.config.page.clone());
    if let Some(mode) = request.view_mode {
        document.set_view_mode(mode);
    }
    if let Some(enabled) = request.edit_mode {
        document.set_edit_mode(enabled);
    }

    let handle = state.sessions.insert(document).await?;
    let session = handle.lock().await;
    info!(
        session = %session.id,
        sections = section_count,
        pages = session.document.total_pages(),
        "Session created"
    );

    Ok((StatusCode::CREATED, Json(snapshot(&session))))
}

/// GET /api/v1/sessions/:id
pub async fn handle_get_session(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<Json<SessionSnapshot>, AppError> {
    let handle = load(&state, id).await?;
    let session = handle.lock().await;
    Ok(Json(snapshot(&session)))
}

/// DELETE /api/v1/sessions/:id
pub async fn handle_delete_session(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<StatusCode, AppError> {
    if !state.sessions.remove(id).await {
        return Err(not_found(id));
    }
    info!(session = %id, "Session closed");
    Ok(StatusCode::NO_CONTENT)
}

/// PUT /api/v1/sessions/:id/tree
///
/// Replaces the content tree, typically after the renderer re-measured heights
/// with all margins cleared.
pub async fn handle_replace_tree(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    Json(request): Json<ReplaceTreeRequest>,
) -> Result<Json<SessionSnapshot>, AppError> {
    request
        .tree
        .validate(&state.config.page)
        .map_err(AppError::Validation)?;

    let handle = load(&state, id).await?;
    let mut session = handle.lock().await;
    session.document.set_tree(request.tree);
    session.touch();
    Ok(Json(snapshot(&session)))
}

/// PUT /api/v1/sessions/:id/mode
///
/// Edit mode is applied before the view mode so a single request can both leave
/// edit mode (dropping the selection) and switch to the page view.
pub async fn handle_set_mode(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    Json(request): Json<ModeRequest>,
) -> Result<Json<SessionSnapshot>, AppError> {
    if request.view_mode.is_none() && request.edit_mode.is_none() {
        return Err(AppError::Validation(
            "at least one of view_mode or edit_mode is required".to_string(),
        ));
    }

    let handle = load(&state, id).await?;
    let mut session = handle.lock().await;
    let before = (
        session.document.edit_mode(),
        session.document.view_mode(),
        session.document.interaction(),
    );
    if let Some(enabled) = request.edit_mode {
        session.document.set_edit_mode(enabled);
    }
    if let Some(mode) = request.view_mode {
        session.document.set_view_mode(mode);
    }
    let after = (
        session.document.edit_mode(),
        session.document.view_mode(),
        session.document.interaction(),
    );
    if after != before {
        session.touch();
    }
    Ok(Json(snapshot(&session)))
}

/// POST /api/v1/sessions/:id/select
pub async fn handle_select(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    Json(request): Json<SelectRequest>,
) -> Result<Json<ActionResponse>, AppError> {
    let handle = load(&state, id).await?;
    let mut session = handle.lock().await;
    let before = session.document.interaction();
    session.document.select(request.key);
    let applied = session.document.controller().selection() == Some(request.key);
    if session.document.interaction() != before {
        session.touch();
    }
    Ok(Json(action(applied, None, &session)))
}

/// POST /api/v1/sessions/:id/click
///
/// Resolves a click to the innermost block under it. Clicks that land on no
/// block are ignored.
pub async fn handle_click(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    Json(hit): Json<HitPath>,
) -> Result<Json<ActionResponse>, AppError> {
    let handle = load(&state, id).await?;
    let mut session = handle.lock().await;
    let before = session.document.interaction();
    let applied = session.document.click(hit).is_some();
    if session.document.interaction() != before {
        session.touch();
    }
    Ok(Json(action(applied, None, &session)))
}

/// POST /api/v1/sessions/:id/commands
pub async fn handle_command(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    Json(request): Json<CommandRequest>,
) -> Result<Json<ActionResponse>, AppError> {
    let handle = load(&state, id).await?;
    let mut session = handle.lock().await;
    let applied = session.document.command(request.command);
    if applied {
        session.touch();
    }
    Ok(Json(action(applied, Some(request.command), &session)))
}

/// POST /api/v1/sessions/:id/keys
pub async fn handle_key(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    Json(request): Json<KeyRequest>,
) -> Result<Json<ActionResponse>, AppError> {
    let handle = load(&state, id).await?;
    let mut session = handle.lock().await;
    let revision = session.document.revision();
    let command = session.document.key_press(&request.key);
    let applied = session.document.revision() != revision;
    if applied {
        session.touch();
    }
    Ok(Json(action(applied, command, &session)))
}

// ────────────────────────────────────────────────────────────────────────────
// Internal helpers
// ────────────────────────────────────────────────────────────────────────────

async fn load(state: &AppState, id: Uuid) -> Result<SharedSession, AppError> {
    state.sessions.get(id).await.ok_or_else(|| not_found(id))
}

fn not_found(id: Uuid) -> AppError {
    AppError::NotFound(format!("Session {id} not found"))
}

fn action(applied: bool, command: Option<SpacingCommand>, session: &StoredSession) -> ActionResponse {
    ActionResponse {
        applied,
        command,
        session: snapshot(session),
    }
}

pub(crate) fn snapshot(session: &StoredSession) -> SessionSnapshot {
    let document = &session.document;
    let layout = document.layout();
    let geometry = document.geometry();

    SessionSnapshot {
        session_id: session.id,
        revision: document.revision(),
        created_at: session.created_at,
        updated_at: session.updated_at,
        view_mode: document.view_mode(),
        edit_mode: document.edit_mode(),
        interaction: document.interaction(),
        is_selection_active: document.is_selection_active(),
        margin_source: layout.source,
        total_pages: layout.total_pages,
        page_width: geometry.page_width,
        page_height: geometry.page_height,
        flowed_height: layout.flowed_height,
        page_breaks: layout.page_breaks.clone(),
        margins: layout
            .margins
            .iter()
            .map(|(&key, &margin_top)| BlockMargin { key, margin_top })
            .collect(),
        placements: layout.placements.clone(),
        overrides: document.controller().overrides().entries(),
    }
}
