//! Axum route handlers for the career coach.

use axum::{
    extract::{Path, State},
    http::StatusCode,
    Json,
};
use serde::Deserialize;
use uuid::Uuid;

use crate::advisory::workflow::{AdviceKind, AdvisoryState};
use crate::errors::AppError;
use crate::session::handlers::load_session;
use crate::state::AppState;

#[derive(Debug, Deserialize)]
pub struct AdviceRequest {
    pub kind: AdviceKind,
}

/// POST /api/v1/sessions/:id/advice
///
/// Fire-and-forget: answers 202 with the Loading state; poll GET for the outcome.
pub async fn handle_request_advice(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    Json(request): Json<AdviceRequest>,
) -> Result<(StatusCode, Json<AdvisoryState>), AppError> {
    let session = load_session(&state, id).await?;
    let (advisory, _handle) = session
        .request_advice(request.kind, state.advisor.clone())
        .await;
    Ok((StatusCode::ACCEPTED, Json(advisory)))
}

/// GET /api/v1/sessions/:id/advice
pub async fn handle_get_advice(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<Json<AdvisoryState>, AppError> {
    let session = load_session(&state, id).await?;
    Ok(Json(session.advisory_state().await))
}

/// DELETE /api/v1/sessions/:id/advice
pub async fn handle_dismiss_advice(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<Json<AdvisoryState>, AppError> {
    let session = load_session(&state, id).await?;
    Ok(Json(session.dismiss_advice().await))
}
