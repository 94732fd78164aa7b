use serde_json::Value;
use std::sync::Arc;
use thiserror::Error;
use tracing::{debug, warn};

use super::json_repair::recover_json;
use super::retry::RetryPolicy;
use crate::domain::models::LlmConfig;
use crate::domain::ports::{CompletionRequest, LlmBackend, LlmError};
use crate::services::prompts;

/// Errors from a generation round trip.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum GenerationError {
    #[error("Generation backend failed: {0}")]
    Backend(#[from] LlmError),

    /// No recovery step produced parseable JSON.
    #[error("Model output is not valid JSON: {diagnostic}")]
    InvalidJson { raw: String, diagnostic: String },

    /// Parseable JSON that does not have the expected shape.
    #[error("Model output violates the expected schema: {reason}")]
    SchemaViolation { reason: String, raw: String },

    #[error("Unsupported stack: {0}")]
    UnsupportedStack(String),
}

impl GenerationError {
    pub fn schema(reason: impl Into<String>, raw: &Value) -> Self {
        GenerationError::SchemaViolation {
            reason: reason.into(),
            raw: raw.to_string(),
        }
    }

    /// Raw model output attached to this error, if any.
    pub fn raw_output(&self) -> Option<&str> {
        match self {
            GenerationError::InvalidJson { raw, .. } | GenerationError::SchemaViolation { raw, .. } => {
                Some(raw)
            }
            _ => None,
        }
    }
}

/// Generation client settings.
#[derive(Debug, Clone)]
pub struct GenerationClientConfig {
    /// Model used when callers do not name one
    pub default_model: String,
    /// Suffixes of model names that accept JSON mode
    pub json_mode_models: Vec<String>,
    /// Spend one extra round trip asking the model to fix broken JSON
    pub repair_with_model: bool,
}

impl Default for GenerationClientConfig {
    fn default() -> Self {
        Self::from(&LlmConfig::default())
    }
}

impl From<&LlmConfig> for GenerationClientConfig {
    fn from(config: &LlmConfig) -> Self {
        Self {
            default_model: config.model.clone(),
            json_mode_models: config.json_mode_models.clone(),
            repair_with_model: config.repair_with_model,
        }
    }
}

/// Sends prompts to a backend and recovers strict JSON from the answer.
pub struct GenerationClient {
    backend: Arc<dyn LlmBackend>,
    retry: RetryPolicy,
    config: GenerationClientConfig,
}

impl GenerationClient {
    pub fn new(
        backend: Arc<dyn LlmBackend>,
        retry: RetryPolicy,
        config: GenerationClientConfig,
    ) -> Self {
        Self {
            backend,
            retry,
            config,
        }
    }

    pub fn with_defaults(backend: Arc<dyn LlmBackend>) -> Self {
        Self::new(backend, RetryPolicy::default(), GenerationClientConfig::default())
    }

    pub fn default_model(&self) -> &str {
        &self.config.default_model
    }

    /// Whether `model` should be asked for a JSON object response.
    pub fn supports_json_mode(&self, model: &str) -> bool {
        self.config
            .json_mode_models
            .iter()
            .any(|suffix| !suffix.is_empty() && model.ends_with(suffix.as_str()))
    }

    /// One completion with retries on transient transport errors.
    pub async fn invoke(
        &self,
        prompt: &str,
        model: &str,
        max_tokens: u32,
        temperature: f32,
    ) -> Result<String, LlmError> {
        let request = CompletionRequest::new(prompt, model)
            .with_max_tokens(max_tokens)
            .with_temperature(temperature)
            .with_json_mode(self.supports_json_mode(model));

        self.retry
            .execute(|| self.backend.complete(&request))
            .await
    }

    /// One completion parsed into JSON, repairing the output if needed.
    pub async fn invoke_json(
        &self,
        prompt: &str,
        model: &str,
        max_tokens: u32,
        temperature: f32,
    ) -> Result<Value, GenerationError> {
        let raw = self.invoke(prompt, model, max_tokens, temperature).await?;

        let diagnostic = match recover_json(&raw) {
            Ok(value) => return Ok(value),
            Err(diagnostic) => diagnostic,
        };

        if !self.config.repair_with_model {
            return Err(GenerationError::InvalidJson { raw, diagnostic });
        }

        debug!(model, %diagnostic, "asking model to repair invalid JSON");
        let repair_prompt = prompts::repair_json_prompt(&raw);
        let repaired = match self.invoke(&repair_prompt, model, max_tokens, 0.0).await {
            Ok(text) => text,
            Err(err) => {
                warn!(model, error = %err, "JSON repair round trip failed");
                return Err(GenerationError::InvalidJson { raw, diagnostic });
            }
        };

        recover_json(&repaired).map_err(|repair_diagnostic| {
            warn!(model, %repair_diagnostic, "model repair answer is still not JSON");
            GenerationError::InvalidJson {
                raw,
                diagnostic: format!("{diagnostic}; after model repair: {repair_diagnostic}"),
            }
        })
    }
}
