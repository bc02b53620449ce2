//! Axum route handlers for stateless estimation.

use axum::{extract::State, Json};
use serde::Serialize;

use crate::estimate::coefficients::CoefficientTable;
use crate::estimate::scoring::{compute, BreakdownLine, EstimateResult};
use crate::estimate::selection::Selection;
use crate::state::AppState;

// ────────────────────────────────────────────────────────────────────────────
// Response types
// ────────────────────────────────────────────────────────────────────────────

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct EstimateResponse {
    pub total: i64,
    pub secondary_total: i64,
    pub breakdown: Vec<BreakdownLine>,
}

impl EstimateResponse {
    pub fn new(result: &EstimateResult, table: &CoefficientTable) -> Self {
        Self {
            total: result.total,
            secondary_total: result.secondary_total(table),
            breakdown: result.breakdown.clone(),
        }
    }
}

/// Option lists for the UI controls, in display order.
#[derive(Debug, Serialize)]
pub struct CoefficientsResponse {
    pub base_amount: i64,
    pub currency_factor: f64,
    pub seniority: Vec<String>,
    pub location: Vec<String>,
    pub industry: Vec<String>,
    pub skills: Vec<String>,
    pub default_selection: Selection,
}

// ────────────────────────────────────────────────────────────────────────────
// Handlers
// ────────────────────────────────────────────────────────────────────────────

/// POST /api/v1/estimate
///
/// Scores a full selection without creating a session.
pub async fn handle_estimate(
    State(state): State<AppState>,
    Json(selection): Json<Selection>,
) -> Json<EstimateResponse> {
    let result = compute(&selection, &state.table);
    Json(EstimateResponse::new(&result, &state.table))
}

/// GET /api/v1/coefficients
pub async fn handle_coefficients(State(state): State<AppState>) -> Json<CoefficientsResponse> {
    let table = &state.table;
    let keys = |map: &crate::estimate::coefficients::CoefficientMap| {
        map.keys().map(str::to_string).collect::<Vec<_>>()
    };

    Json(CoefficientsResponse {
        base_amount: table.base_amount,
        currency_factor: table.currency_factor,
        seniority: keys(&table.seniority),
        location: keys(&table.location),
        industry: keys(&table.industry),
        skills: keys(&table.skills),
        default_selection: Selection::default(),
    })
}
