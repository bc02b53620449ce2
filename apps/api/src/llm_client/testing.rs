//! Scripted `AdvisoryClient` doubles for tests.

use async_trait::async_trait;
use tokio::sync::{oneshot, Mutex};

use crate::llm_client::{AdvisoryClient, AdvisoryError};

#[derive(Debug, Clone, Copy)]
pub enum FixedReply {
    Text(&'static str),
    Empty,
    Fail,
}

/// Answers every prompt the same way, immediately.
pub struct FixedClient {
    reply: FixedReply,
    pub prompts: Mutex<Vec<String>>,
}

impl FixedClient {
    pub fn new(reply: FixedReply) -> Self {
        Self {
            reply,
            prompts: Mutex::new(Vec::new()),
        }
    }
}

#[async_trait]
impl AdvisoryClient for FixedClient {
    async fn generate(&self, prompt: &str) -> Result<Option<String>, AdvisoryError> {
        self.prompts.lock().await.push(prompt.to_string());
        match self.reply {
            FixedReply::Text(text) => Ok(Some(text.to_string())),
            FixedReply::Empty => Ok(None),
            FixedReply::Fail => Err(AdvisoryError::Api {
                status: 500,
                message: "boom".to_string(),
            }),
        }
    }
}

pub type Reply = Result<Option<String>, AdvisoryError>;

/// Holds each call open until the test resolves it through a oneshot sender.
///
/// Calls are routed by needle: the first pending entry whose needle occurs in the
/// prompt answers it, so resolution order is independent of task scheduling.
#[derive(Default)]
pub struct GatedClient {
    gates: Mutex<Vec<(String, oneshot::Receiver<Reply>)>>,
    pub prompts: Mutex<Vec<String>>,
}

impl GatedClient {
    pub async fn gate(&self, needle: &str) -> oneshot::Sender<Reply> {
        let (tx, rx) = oneshot::channel();
        self.gates.lock().await.push((needle.to_string(), rx));
        tx
    }
}

#[async_trait]
impl AdvisoryClient for GatedClient {
    async fn generate(&self, prompt: &str) -> Result<Option<String>, AdvisoryError> {
        self.prompts.lock().await.push(prompt.to_string());
        let rx = {
            let mut gates = self.gates.lock().await;
            let pos = gates
                .iter()
                .position(|(needle, _)| prompt.contains(needle.as_str()))
                .unwrap_or_else(|| panic!("no gate matches prompt: {prompt}"));
            gates.remove(pos).1
        };
        rx.await.unwrap_or_else(|_| {
            Err(AdvisoryError::Api {
                status: 499,
                message: "gate dropped".to_string(),
            })
        })
    }
}
