use std::sync::Arc;

use crate::estimate::coefficients::CoefficientTable;
use crate::llm_client::AdvisoryClient;
use crate::session::SessionStore;

/// Shared application state injected into all route handlers via Axum extractors.
#[derive(Clone)]
pub struct AppState {
    /// Immutable for the life of the process.
    pub table: Arc<CoefficientTable>,
    pub sessions: Arc<SessionStore>,
    /// Pluggable generation backend. Default: `GeminiClient`.
    pub advisor: Arc<dyn AdvisoryClient>,
}

impl AppState {
    pub fn new(table: CoefficientTable, advisor: Arc<dyn AdvisoryClient>) -> Self {
        let table = Arc::new(table);
        Self {
            sessions: Arc::new(SessionStore::new(Arc::clone(&table))),
            table,
            advisor,
        }
    }
}
