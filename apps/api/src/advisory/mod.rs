// Career coach: prompt templates and the request state machine.
// All generation calls go through llm_client — no direct HTTP calls here.

pub mod handlers;
pub mod prompts;
pub mod workflow;
