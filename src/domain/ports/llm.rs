//! Text generation port.
//!
//! A backend takes a prompt and returns text that should be JSON. Nothing
//! about the answer is trusted; recovery lives in the generation client.

use async_trait::async_trait;
use thiserror::Error;

/// One completion request sent to a backend.
#[derive(Debug, Clone, PartialEq)]
pub struct CompletionRequest {
    pub prompt: String,
    pub model: String,
    pub max_tokens: u32,
    pub temperature: f32,
    /// Ask the backend to constrain output to a JSON object.
    pub json_mode: bool,
}

impl CompletionRequest {
    pub fn new(prompt: impl Into<String>, model: impl Into<String>) -> Self {
        Self {
            prompt: prompt.into(),
            model: model.into(),
            max_tokens: 650,
            temperature: 0.2,
            json_mode: false,
        }
    }

    pub fn with_max_tokens(mut self, max_tokens: u32) -> Self {
        self.max_tokens = max_tokens;
        self
    }

    pub fn with_temperature(mut self, temperature: f32) -> Self {
        self.temperature = temperature;
        self
    }

    pub fn with_json_mode(mut self, json_mode: bool) -> Self {
        self.json_mode = json_mode;
        self
    }
}

/// Transport-level failures of a generation backend.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum LlmError {
    /// HTTP 429
    #[error("Rate limit exceeded: {0}")]
    RateLimited(String),

    /// HTTP 5xx
    #[error("Server error ({status}): {body}")]
    Server { status: u16, body: String },

    #[error("Request timeout")]
    Timeout,

    #[error("Network error: {0}")]
    Network(String),

    /// HTTP 401 / 403
    #[error("Authentication failed: {0}")]
    Authentication(String),

    /// Any other 4xx, or a malformed response envelope
    #[error("Invalid request: {0}")]
    InvalidRequest(String),

    #[error("Backend returned an empty completion")]
    EmptyResponse,

    #[error("API key not set: {0}")]
    MissingApiKey(String),
}

impl LlmError {
    /// Returns true if this error is transient and should be retried
    pub fn is_transient(&self) -> bool {
        matches!(
            self,
            LlmError::RateLimited(_)
                | LlmError::Server { .. }
                | LlmError::Timeout
                | LlmError::Network(_)
        )
    }

    /// Map a non-success HTTP status and its body to an error.
    pub fn from_status(status: u16, body: impl Into<String>) -> Self {
        let body = body.into();
        match status {
            429 => LlmError::RateLimited(body),
            401 | 403 => LlmError::Authentication(body),
            500..=599 => LlmError::Server { status, body },
            _ => LlmError::InvalidRequest(format!("HTTP {status}: {body}")),
        }
    }
}

/// A text generation backend.
#[async_trait]
pub trait LlmBackend: Send + Sync {
    /// Backend name for diagnostics.
    fn name(&self) -> &'static str;

    /// Run one completion. Implementations bound each call with a timeout.
    async fn complete(&self, request: &CompletionRequest) -> Result<String, LlmError>;
}
