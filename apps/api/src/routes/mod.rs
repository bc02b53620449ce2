pub mod health;

use axum::{
    routing::{get, patch, post},
    Router,
};

use crate::advisory::handlers as advisory;
use crate::estimate::handlers as estimate;
use crate::session::handlers as session;
use crate::state::AppState;

pub fn build_router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(health::health_handler))
        // Stateless estimation
        .route("/api/v1/coefficients", get(estimate::handle_coefficients))
        .route("/api/v1/estimate", post(estimate::handle_estimate))
        // Sessions
        .route("/api/v1/sessions", post(session::handle_create_session))
        .route(
            "/api/v1/sessions/:id",
            get(session::handle_get_session).delete(session::handle_delete_session),
        )
        .route(
            "/api/v1/sessions/:id/estimate",
            get(session::handle_get_estimate),
        )
        .route(
            "/api/v1/sessions/:id/selection",
            patch(session::handle_update_selection),
        )
        .route(
            "/api/v1/sessions/:id/skills/:skill",
            post(session::handle_toggle_skill),
        )
        .route("/api/v1/sessions/:id/reset", post(session::handle_reset))
        // Career coach
        .route(
            "/api/v1/sessions/:id/advice",
            get(advisory::handle_get_advice)
                .post(advisory::handle_request_advice)
                .delete(advisory::handle_dismiss_advice),
        )
        .with_state(state)
}
