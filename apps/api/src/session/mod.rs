//! Sessions — one client's Selection, its current estimate, and its advisory workflow.
//!
//! Each session serializes its own mutations behind a `tokio::sync::Mutex`.
//! The lock is never held across the generation call: `request_advice` captures
//! the prompt under the lock, releases it, and re-locks only to commit.

pub mod handlers;

use std::collections::HashMap;
use std::sync::Arc;

use chrono::{DateTime, Duration, Utc};
use serde::Serialize;
use tokio::sync::{Mutex, RwLock};
use tokio::task::JoinHandle;
use tracing::{debug, info, warn};
use uuid::Uuid;

use crate::advisory::prompts::build_prompt;
use crate::advisory::workflow::{AdviceKind, AdvisoryState, AdvisoryWorkflow};
use crate::estimate::coefficients::CoefficientTable;
use crate::estimate::handlers::EstimateResponse;
use crate::estimate::scoring::{compute, EstimateResult};
use crate::estimate::selection::{Selection, SelectionPatch};
use crate::llm_client::AdvisoryClient;

struct SessionState {
    selection: Selection,
    estimate: EstimateResult,
    advisory: AdvisoryWorkflow,
    last_active: DateTime<Utc>,
}

impl SessionState {
    /// Any client call, reads included, keeps the session alive.
    fn touch(&mut self) {
        self.last_active = Utc::now();
    }

    fn recompute(&mut self, table: &CoefficientTable) {
        self.estimate = compute(&self.selection, table);
        self.touch();
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct SessionSnapshot {
    pub session_id: Uuid,
    pub selection: Selection,
    pub estimate: EstimateResponse,
    pub advisory: AdvisoryState,
    pub last_active_at: DateTime<Utc>,
}

pub struct Session {
    id: Uuid,
    table: Arc<CoefficientTable>,
    inner: Mutex<SessionState>,
}

impl Session {
    pub fn new(table: Arc<CoefficientTable>) -> Self {
        let selection = Selection::default();
        let estimate = compute(&selection, &table);
        Self {
            id: Uuid::new_v4(),
            table,
            inner: Mutex::new(SessionState {
                selection,
                estimate,
                advisory: AdvisoryWorkflow::new(),
                last_active: Utc::now(),
            }),
        }
    }

    pub fn id(&self) -> Uuid {
        self.id
    }

    pub async fn snapshot(&self) -> SessionSnapshot {
        let mut inner = self.inner.lock().await;
        inner.touch();
        self.snapshot_of(&inner)
    }

    fn snapshot_of(&self, inner: &SessionState) -> SessionSnapshot {
        SessionSnapshot {
            session_id: self.id,
            selection: inner.selection.clone(),
            estimate: EstimateResponse::new(&inner.estimate, &self.table),
            advisory: inner.advisory.state().clone(),
            last_active_at: inner.last_active,
        }
    }

    pub async fn estimate(&self) -> EstimateResponse {
        let mut inner = self.inner.lock().await;
        inner.touch();
        EstimateResponse::new(&inner.estimate, &self.table)
    }

    /// Applies a partial selection and recomputes the estimate.
    pub async fn update_selection(&self, patch: SelectionPatch) -> EstimateResponse {
        let mut inner = self.inner.lock().await;
        inner.selection.apply(patch);
        inner.recompute(&self.table);
        EstimateResponse::new(&inner.estimate, &self.table)
    }

    pub async fn toggle_skill(&self, skill: &str) -> EstimateResponse {
        let mut inner = self.inner.lock().await;
        let selected = inner.selection.toggle_skill(skill);
        debug!("Session {}: skill '{}' selected={}", self.id, skill, selected);
        inner.recompute(&self.table);
        EstimateResponse::new(&inner.estimate, &self.table)
    }

    /// Restores the default selection and forces the advisory workflow to Idle.
    pub async fn reset_all(&self) -> SessionSnapshot {
        let mut inner = self.inner.lock().await;
        inner.selection = Selection::default();
        inner.recompute(&self.table);
        inner.advisory.reset_all();
        self.snapshot_of(&inner)
    }

    pub async fn advisory_state(&self) -> AdvisoryState {
        let mut inner = self.inner.lock().await;
        inner.touch();
        inner.advisory.state().clone()
    }

    pub async fn dismiss_advice(&self) -> AdvisoryState {
        let mut inner = self.inner.lock().await;
        inner.touch();
        if !inner.advisory.dismiss() {
            debug!("Session {}: dismiss while idle ignored", self.id);
        }
        inner.advisory.state().clone()
    }

    /// Issues a new advice request against the current selection and estimate.
    ///
    /// Returns the `Loading` state and the handle of the task that will commit
    /// the outcome. Any earlier in-flight request is superseded.
    pub async fn request_advice(
        self: &Arc<Self>,
        kind: AdviceKind,
        client: Arc<dyn AdvisoryClient>,
    ) -> (AdvisoryState, JoinHandle<()>) {
        let (ticket, prompt, state) = {
            let mut inner = self.inner.lock().await;
            inner.touch();
            let prompt = build_prompt(&inner.selection, inner.estimate.total, kind);
            let ticket = inner.advisory.begin(kind);
            (ticket, prompt, inner.advisory.state().clone())
        };

        info!(
            "Session {}: advice requested (kind={:?}, generation={})",
            self.id,
            kind,
            ticket.generation()
        );

        let session = Arc::clone(self);
        let handle = tokio::spawn(async move {
            let outcome = client.generate(&prompt).await;
            if let Err(e) = &outcome {
                warn!(
                    "Session {}: {:?} advice request failed: {e}",
                    session.id,
                    ticket.kind()
                );
            }

            let mut inner = session.inner.lock().await;
            if !inner.advisory.complete(ticket, outcome) {
                debug!(
                    "Session {}: dropping superseded advice (generation={})",
                    session.id,
                    ticket.generation()
                );
            }
        });

        (state, handle)
    }

    async fn last_active(&self) -> DateTime<Utc> {
        self.inner.lock().await.last_active
    }
}

/// In-memory registry of live sessions. Nothing is persisted.
pub struct SessionStore {
    table: Arc<CoefficientTable>,
    sessions: RwLock<HashMap<Uuid, Arc<Session>>>,
}

impl SessionStore {
    pub fn new(table: Arc<CoefficientTable>) -> Self {
        Self {
            table,
            sessions: RwLock::new(HashMap::new()),
        }
    }

    pub async fn create(&self) -> Arc<Session> {
        let session = Arc::new(Session::new(Arc::clone(&self.table)));
        self.sessions
            .write()
            .await
            .insert(session.id(), Arc::clone(&session));
        info!("Session {} created", session.id());
        session
    }

    pub async fn get(&self, id: Uuid) -> Option<Arc<Session>> {
        self.sessions.read().await.get(&id).cloned()
    }

    pub async fn remove(&self, id: Uuid) -> bool {
        self.sessions.write().await.remove(&id).is_some()
    }

    pub async fn len(&self) -> usize {
        self.sessions.read().await.len()
    }

    /// Drops sessions idle for longer than `ttl` as of `now`. Returns how many were removed.
    pub async fn purge_idle(&self, now: DateTime<Utc>, ttl: Duration) -> usize {
        let mut sessions = self.sessions.write().await;
        let mut expired = Vec::new();
        for (id, session) in sessions.iter() {
            if now - session.last_active().await > ttl {
                expired.push(*id);
            }
        }
        for id in &expired {
            sessions.remove(id);
        }
        if !expired.is_empty() {
            info!("Purged {} idle session(s)", expired.len());
        }
        expired.len()
    }
}
