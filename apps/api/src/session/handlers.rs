//! Axum route handlers for session lifecycle and selection changes.

use std::sync::Arc;

use axum::{
    extract::{Path, State},
    http::StatusCode,
    Json,
};
use uuid::Uuid;

use crate::errors::AppError;
use crate::estimate::handlers::EstimateResponse;
use crate::estimate::selection::SelectionPatch;
use crate::session::{Session, SessionSnapshot};
use crate::state::AppState;

pub(crate) async fn load_session(state: &AppState, id: Uuid) -> Result<Arc<Session>, AppError> {
    state
        .sessions
        .get(id)
        .await
        .ok_or_else(|| AppError::NotFound(format!("Session {id} not found")))
}

/// POST /api/v1/sessions
pub async fn handle_create_session(
    State(state): State<AppState>,
) -> (StatusCode, Json<SessionSnapshot>) {
    let session = state.sessions.create().await;
    (StatusCode::CREATED, Json(session.snapshot().await))
}

/// GET /api/v1/sessions/:id
pub async fn handle_get_session(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<Json<SessionSnapshot>, AppError> {
    let session = load_session(&state, id).await?;
    Ok(Json(session.snapshot().await))
}

/// DELETE /api/v1/sessions/:id
pub async fn handle_delete_session(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<StatusCode, AppError> {
    if state.sessions.remove(id).await {
        Ok(StatusCode::NO_CONTENT)
    } else {
        Err(AppError::NotFound(format!("Session {id} not found")))
    }
}

/// GET /api/v1/sessions/:id/estimate
pub async fn handle_get_estimate(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<Json<EstimateResponse>, AppError> {
    let session = load_session(&state, id).await?;
    Ok(Json(session.estimate().await))
}

/// PATCH /api/v1/sessions/:id/selection
///
/// Applies a partial selection and returns the recomputed estimate.
pub async fn handle_update_selection(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    Json(patch): Json<SelectionPatch>,
) -> Result<Json<EstimateResponse>, AppError> {
    let session = load_session(&state, id).await?;
    Ok(Json(session.update_selection(patch).await))
}

/// POST /api/v1/sessions/:id/skills/:skill
///
/// Toggles one skill in or out of the selection.
pub async fn handle_toggle_skill(
    State(state): State<AppState>,
    Path((id, skill)): Path<(Uuid, String)>,
) -> Result<Json<EstimateResponse>, AppError> {
    if skill.trim().is_empty() {
        return Err(AppError::Validation("skill cannot be empty".to_string()));
    }
    let session = load_session(&state, id).await?;
    Ok(Json(session.toggle_skill(&skill).await))
}

/// POST /api/v1/sessions/:id/reset
///
/// Restores the default selection and clears any advice.
pub async fn handle_reset(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<Json<SessionSnapshot>, AppError> {
    let session = load_session(&state, id).await?;
    Ok(Json(session.reset_all().await))
}
