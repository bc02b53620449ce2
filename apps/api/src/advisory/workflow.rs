//! Advisory Workflow — the career-coach request state machine.
//!
//! States: Idle → Loading(kind) → Loaded(kind, text) | Failed(kind, message) → Idle …
//!
//! Every `begin` bumps a generation counter and hands back a ticket. An outcome is
//! committed only if its ticket's generation is still current, so a superseded,
//! dismissed or reset request can never overwrite newer state. Network calls are
//! not cancelled; their results are just dropped here.

use serde::{Deserialize, Serialize};

use crate::llm_client::AdvisoryError;

/// Shown when the service answered without usable text.
pub const FALLBACK_ADVICE: &str = "I couldn't generate advice at this moment. Please try again.";

/// Shown for any transport, parse or credential failure.
pub const CONNECTION_ERROR_MESSAGE: &str =
    "Sorry, I'm having trouble connecting to the career coach right now.";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AdviceKind {
    Negotiation,
    Roadmap,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum AdvisoryState {
    Idle,
    Loading { kind: AdviceKind },
    Loaded { kind: AdviceKind, text: String },
    Failed { kind: AdviceKind, message: String },
}

/// Proof that a request was issued at a given generation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AdvisoryTicket {
    generation: u64,
    kind: AdviceKind,
}

impl AdvisoryTicket {
    pub fn kind(&self) -> AdviceKind {
        self.kind
    }

    pub fn generation(&self) -> u64 {
        self.generation
    }
}

#[derive(Debug, Clone)]
pub struct AdvisoryWorkflow {
    state: AdvisoryState,
    generation: u64,
}

impl Default for AdvisoryWorkflow {
    fn default() -> Self {
        Self::new()
    }
}

impl AdvisoryWorkflow {
    pub fn new() -> Self {
        Self {
            state: AdvisoryState::Idle,
            generation: 0,
        }
    }

    pub fn state(&self) -> &AdvisoryState {
        &self.state
    }

    /// Starts a request from any state, superseding whatever was in flight.
    pub fn begin(&mut self, kind: AdviceKind) -> AdvisoryTicket {
        self.generation += 1;
        self.state = AdvisoryState::Loading { kind };
        AdvisoryTicket {
            generation: self.generation,
            kind,
        }
    }

    /// Applies a client outcome. Returns `false` (and changes nothing) for stale tickets.
    pub fn complete(
        &mut self,
        ticket: AdvisoryTicket,
        outcome: Result<Option<String>, AdvisoryError>,
    ) -> bool {
        if ticket.generation != self.generation {
            return false;
        }

        let kind = ticket.kind;
        self.state = match outcome {
            Ok(Some(text)) if !text.trim().is_empty() => AdvisoryState::Loaded { kind, text },
            Ok(_) => AdvisoryState::Loaded {
                kind,
                text: FALLBACK_ADVICE.to_string(),
            },
            Err(_) => AdvisoryState::Failed {
                kind,
                message: CONNECTION_ERROR_MESSAGE.to_string(),
            },
        };
        true
    }

    /// Back to Idle, dropping any result and any in-flight request.
    /// Returns `false` if already Idle.
    pub fn dismiss(&mut self) -> bool {
        if self.state == AdvisoryState::Idle {
            return false;
        }
        self.invalidate();
        true
    }

    /// Forces Idle unconditionally.
    pub fn reset_all(&mut self) {
        self.invalidate();
    }

    fn invalidate(&mut self) {
        self.generation += 1;
        self.state = AdvisoryState::Idle;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn api_error() -> AdvisoryError {
        AdvisoryError::Api {
            status: 503,
            message: "unavailable".to_string(),
        }
    }

    #[test]
    fn test_initial_state_is_idle() {
        assert_eq!(AdvisoryWorkflow::new().state(), &AdvisoryState::Idle);
    }

    #[test]
    fn test_begin_sets_loading() {
        let mut wf = AdvisoryWorkflow::new();
        let ticket = wf.begin(AdviceKind::Roadmap);
        assert_eq!(ticket.kind(), AdviceKind::Roadmap);
        assert_eq!(
            wf.state(),
            &AdvisoryState::Loading {
                kind: AdviceKind::Roadmap
            }
        );
    }

    #[test]
    fn test_success_with_text_is_loaded() {
        let mut wf = AdvisoryWorkflow::new();
        let ticket = wf.begin(AdviceKind::Negotiation);
        assert!(wf.complete(ticket, Ok(Some("Point one.".to_string()))));
        assert_eq!(
            wf.state(),
            &AdvisoryState::Loaded {
                kind: AdviceKind::Negotiation,
                text: "Point one.".to_string()
            }
        );
    }

    #[test]
    fn test_success_without_text_is_fallback() {
        let mut wf = AdvisoryWorkflow::new();
        let ticket = wf.begin(AdviceKind::Negotiation);
        wf.complete(ticket, Ok(None));
        assert_eq!(
            wf.state(),
            &AdvisoryState::Loaded {
                kind: AdviceKind::Negotiation,
                text: FALLBACK_ADVICE.to_string()
            }
        );

        let ticket = wf.begin(AdviceKind::Roadmap);
        wf.complete(ticket, Ok(Some(String::new())));
        assert_eq!(
            wf.state(),
            &AdvisoryState::Loaded {
                kind: AdviceKind::Roadmap,
                text: FALLBACK_ADVICE.to_string()
            }
        );
    }

    #[test]
    fn test_error_is_failed_never_loaded() {
        let mut wf = AdvisoryWorkflow::new();
        let ticket = wf.begin(AdviceKind::Roadmap);
        wf.complete(ticket, Err(api_error()));
        assert_eq!(
            wf.state(),
            &AdvisoryState::Failed {
                kind: AdviceKind::Roadmap,
                message: CONNECTION_ERROR_MESSAGE.to_string()
            }
        );
    }

    #[test]
    fn test_superseded_outcome_is_ignored() {
        let mut wf = AdvisoryWorkflow::new();
        let first = wf.begin(AdviceKind::Negotiation);
        let second = wf.begin(AdviceKind::Roadmap);

        assert!(wf.complete(second, Ok(Some("roadmap".to_string()))));
        assert!(!wf.complete(first, Ok(Some("negotiation".to_string()))));
        assert_eq!(
            wf.state(),
            &AdvisoryState::Loaded {
                kind: AdviceKind::Roadmap,
                text: "roadmap".to_string()
            }
        );
    }

    #[test]
    fn test_stale_outcome_cannot_clobber_loading() {
        let mut wf = AdvisoryWorkflow::new();
        let first = wf.begin(AdviceKind::Negotiation);
        let _second = wf.begin(AdviceKind::Negotiation);

        assert!(!wf.complete(first, Err(api_error())));
        assert_eq!(
            wf.state(),
            &AdvisoryState::Loading {
                kind: AdviceKind::Negotiation
            }
        );
    }

    #[test]
    fn test_dismiss_from_loaded_and_failed() {
        let mut wf = AdvisoryWorkflow::new();
        let ticket = wf.begin(AdviceKind::Roadmap);
        wf.complete(ticket, Ok(Some("text".to_string())));
        assert!(wf.dismiss());
        assert_eq!(wf.state(), &AdvisoryState::Idle);

        let ticket = wf.begin(AdviceKind::Roadmap);
        wf.complete(ticket, Err(api_error()));
        assert!(wf.dismiss());
        assert_eq!(wf.state(), &AdvisoryState::Idle);
    }

    #[test]
    fn test_dismiss_when_idle_is_noop() {
        let mut wf = AdvisoryWorkflow::new();
        assert!(!wf.dismiss());
        assert_eq!(wf.state(), &AdvisoryState::Idle);
    }

    #[test]
    fn test_dismissed_in_flight_response_cannot_resurrect() {
        let mut wf = AdvisoryWorkflow::new();
        let ticket = wf.begin(AdviceKind::Negotiation);
        assert!(wf.dismiss());
        assert!(!wf.complete(ticket, Ok(Some("late".to_string()))));
        assert_eq!(wf.state(), &AdvisoryState::Idle);
    }

    #[test]
    fn test_reset_all_from_any_state() {
        let mut wf = AdvisoryWorkflow::new();
        wf.reset_all();
        assert_eq!(wf.state(), &AdvisoryState::Idle);

        let ticket = wf.begin(AdviceKind::Roadmap);
        wf.reset_all();
        assert_eq!(wf.state(), &AdvisoryState::Idle);
        assert!(!wf.complete(ticket, Ok(Some("late".to_string()))));

        let ticket = wf.begin(AdviceKind::Roadmap);
        wf.complete(ticket, Ok(Some("done".to_string())));
        wf.reset_all();
        assert_eq!(wf.state(), &AdvisoryState::Idle);
    }

    #[test]
    fn test_cycle_can_repeat() {
        let mut wf = AdvisoryWorkflow::new();
        for round in 0..3 {
            let ticket = wf.begin(AdviceKind::Negotiation);
            assert!(wf.complete(ticket, Ok(Some(format!("round {round}")))));
            assert!(wf.dismiss());
        }
        assert_eq!(wf.state(), &AdvisoryState::Idle);
    }

    #[test]
    fn test_state_wire_format() {
        let loaded = AdvisoryState::Loaded {
            kind: AdviceKind::Negotiation,
            text: "hi".to_string(),
        };
        assert_eq!(
            serde_json::to_value(&loaded).unwrap(),
            serde_json::json!({"status": "loaded", "kind": "negotiation", "text": "hi"})
        );
        assert_eq!(
            serde_json::to_value(AdvisoryState::Idle).unwrap(),
            serde_json::json!({"status": "idle"})
        );
    }
}
