//! LLM Client — the single point of entry for text-generation calls in DataWorth.
//!
//! ARCHITECTURAL RULE: No other module may call the generation API directly.
//! The advisory workflow only sees the `AdvisoryClient` trait, so tests can
//! script responses without a network.

use std::time::Duration;

use anyhow::{Context, Result};
use async_trait::async_trait;
use reqwest::{Client, StatusCode};
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::{debug, warn};

use crate::config::Config;

#[cfg(test)]
pub mod testing;

const MAX_RETRIES: u32 = 3;
const RETRY_BASE_DELAY_MS: u64 = 1000;

#[derive(Debug, Error)]
pub enum AdvisoryError {
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("API error (status {status}): {message}")]
    Api { status: u16, message: String },

    #[error("JSON parse error: {0}")]
    Parse(#[from] serde_json::Error),

    #[error("Rate limited after {retries} retries")]
    RateLimited { retries: u32 },

    #[error("No API credential configured")]
    MissingCredential,
}

/// The boundary the advisory workflow calls through.
///
/// `Ok(None)` means the service answered but produced no usable text.
#[async_trait]
pub trait AdvisoryClient: Send + Sync {
    async fn generate(&self, prompt: &str) -> Result<Option<String>, AdvisoryError>;
}

#[derive(Debug, Serialize)]
struct GenerateRequest<'a> {
    contents: Vec<RequestContent<'a>>,
}

#[derive(Debug, Serialize)]
struct RequestContent<'a> {
    parts: Vec<RequestPart<'a>>,
}

#[derive(Debug, Serialize)]
struct RequestPart<'a> {
    text: &'a str,
}

impl<'a> GenerateRequest<'a> {
    fn from_prompt(prompt: &'a str) -> Self {
        Self {
            contents: vec![RequestContent {
                parts: vec![RequestPart { text: prompt }],
            }],
        }
    }
}

/// Every level is optional: the service may omit any of them or send `null`.
#[derive(Debug, Default, Deserialize)]
pub struct GenerateResponse {
    #[serde(default)]
    pub candidates: Option<Vec<Candidate>>,
}

#[derive(Debug, Deserialize)]
pub struct Candidate {
    #[serde(default)]
    pub content: Option<CandidateContent>,
}

#[derive(Debug, Deserialize)]
pub struct CandidateContent {
    #[serde(default)]
    pub parts: Option<Vec<ResponsePart>>,
}

#[derive(Debug, Deserialize)]
pub struct ResponsePart {
    /// Kept loose so a non-string `text` degrades instead of failing the parse.
    #[serde(default)]
    pub text: Option<serde_json::Value>,
}

impl GenerateResponse {
    /// Text of `candidates[0].content.parts[0]`, if it is a non-blank string.
    pub fn text(&self) -> Option<&str> {
        self.candidates
            .as_deref()
            .and_then(<[Candidate]>::first)
            .and_then(|c| c.content.as_ref())
            .and_then(|c| c.parts.as_deref())
            .and_then(<[ResponsePart]>::first)
            .and_then(|p| p.text.as_ref())
            .and_then(serde_json::Value::as_str)
            .filter(|t| !t.trim().is_empty())
    }

    fn candidate_count(&self) -> usize {
        self.candidates.as_ref().map_or(0, Vec::len)
    }
}

#[derive(Debug, Deserialize)]
struct ApiError {
    error: ApiErrorBody,
}

#[derive(Debug, Deserialize)]
struct ApiErrorBody {
    message: String,
}

/// Gemini `generateContent` client.
///
/// 429, 5xx and connection failures are retried up to `MAX_RETRIES` attempts
/// with exponential backoff. A request that times out is not retried, so a
/// hung upstream costs one timeout period.
#[derive(Clone)]
pub struct GeminiClient {
    client: Client,
    endpoint: String,
    api_key: Option<String>,
    model: String,
    retry_base_delay: Duration,
}

impl GeminiClient {
    pub fn new(config: &Config) -> Result<Self> {
        let client = Client::builder()
            .timeout(Duration::from_secs(config.advisory_timeout_secs))
            .build()
            .context("Failed to build HTTP client")?;

        Ok(Self {
            client,
            endpoint: format!(
                "{}/models/{}:generateContent",
                config.gemini_api_base.trim_end_matches('/'),
                config.gemini_model
            ),
            api_key: config.gemini_api_key.clone(),
            model: config.gemini_model.clone(),
            retry_base_delay: Duration::from_millis(RETRY_BASE_DELAY_MS),
        })
    }

    #[cfg(test)]
    fn with_retry_base_delay(mut self, delay: Duration) -> Self {
        self.retry_base_delay = delay;
        self
    }

    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }

    pub fn has_credential(&self) -> bool {
        self.api_key.is_some()
    }
}

#[async_trait]
impl AdvisoryClient for GeminiClient {
    async fn generate(&self, prompt: &str) -> Result<Option<String>, AdvisoryError> {
        let api_key = self.api_key.as_deref().ok_or(AdvisoryError::MissingCredential)?;
        let request_body = GenerateRequest::from_prompt(prompt);

        let mut last_error: Option<AdvisoryError> = None;

        for attempt in 1..=MAX_RETRIES {
            if attempt > 1 {
                // Exponential backoff: base, 2 * base
                let delay = self.retry_base_delay * 2u32.pow(attempt - 2);
                warn!(
                    model = %self.model,
                    attempt,
                    max_attempts = MAX_RETRIES,
                    "Retrying generation after {}ms: {}",
                    delay.as_millis(),
                    last_error
                        .as_ref()
                        .map(ToString::to_string)
                        .unwrap_or_default()
                );
                tokio::time::sleep(delay).await;
            }

            let response = self
                .client
                .post(&self.endpoint)
                .header("x-goog-api-key", api_key)
                .json(&request_body)
                .send()
                .await;

            let response = match response {
                Ok(r) => r,
                Err(e) if e.is_timeout() => {
                    warn!(model = %self.model, attempt, "Generation request timed out");
                    return Err(AdvisoryError::Http(e));
                }
                Err(e) => {
                    last_error = Some(AdvisoryError::Http(e));
                    continue;
                }
            };

            let status = response.status();

            if status == StatusCode::TOO_MANY_REQUESTS || status.is_server_error() {
                let body = response.text().await.unwrap_or_default();
                last_error = Some(AdvisoryError::Api {
                    status: status.as_u16(),
                    message: api_error_message(body),
                });
                continue;
            }

            if !status.is_success() {
                let body = response.text().await.unwrap_or_default();
                return Err(AdvisoryError::Api {
                    status: status.as_u16(),
                    message: api_error_message(body),
                });
            }

            let body = response.text().await?;
            let parsed = parse_generate_response(&body)?;
            debug!(
                model = %self.model,
                attempt,
                "Generation call succeeded: candidates={}",
                parsed.candidate_count()
            );
            return Ok(parsed.text().map(str::to_string));
        }

        Err(last_error.unwrap_or(AdvisoryError::RateLimited {
            retries: MAX_RETRIES,
        }))
    }
}

/// `{"error":{"message"}}` when the body has that shape, else the raw body.
fn api_error_message(body: String) -> String {
    serde_json::from_str::<ApiError>(&body)
        .map(|e| e.error.message)
        .unwrap_or(body)
}

/// Any JSON object is accepted; only non-JSON bodies are errors.
fn parse_generate_response(body: &str) -> Result<GenerateResponse, AdvisoryError> {
    serde_json::from_str(body).map_err(AdvisoryError::Parse)
}
