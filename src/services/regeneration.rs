//! Single-record refinement of an epic or a story.
//!
//! One call at the base temperature. If the answer merely echoes the
//! previous description, one more call at a higher temperature asks for new
//! wording, and that answer is returned whatever it says.

use serde_json::Value;
use std::sync::Arc;
use tracing::{debug, instrument};

use crate::domain::models::text::normalize_key;
use crate::domain::models::{Epic, LlmConfig, Story};
use crate::services::epic_generator::normalize_epic;
use crate::services::generation::{GenerationClient, GenerationError};
use crate::services::normalize::{list_field, string_field};
use crate::services::prompts;

/// Model parameters for regeneration.
#[derive(Debug, Clone)]
pub struct RegeneratorConfig {
    pub model: String,
    pub max_tokens: u32,
    pub temperature: f32,
    /// Temperature of the second call after an echo
    pub retry_temperature: f32,
}

impl Default for RegeneratorConfig {
    fn default() -> Self {
        Self::from(&LlmConfig::default())
    }
}

impl From<&LlmConfig> for RegeneratorConfig {
    fn from(config: &LlmConfig) -> Self {
        Self {
            model: config.model.clone(),
            max_tokens: config.regenerate_max_tokens,
            temperature: config.temperature,
            retry_temperature: config.regeneration_retry_temperature,
        }
    }
}

pub struct Regenerator {
    client: Arc<GenerationClient>,
    config: RegeneratorConfig,
}

impl Regenerator {
    pub fn new(client: Arc<GenerationClient>, config: RegeneratorConfig) -> Self {
        Self { client, config }
    }

    #[instrument(skip(self, source_text, previous_description))]
    pub async fn regenerate_epic(
        &self,
        source_text: &str,
        epic_name: &str,
        previous_description: Option<&str>,
    ) -> Result<Epic, GenerationError> {
        let prompt = prompts::regenerate_epic_prompt(source_text, epic_name, previous_description, false);
        let epic = self.epic_call(&prompt, self.config.temperature).await?;

        if !is_echo(&epic.description, previous_description) {
            return Ok(epic);
        }

        debug!("regenerated epic echoed its input, retrying with new wording");
        let prompt = prompts::regenerate_epic_prompt(source_text, epic_name, previous_description, true);
        self.epic_call(&prompt, self.config.retry_temperature).await
    }

    /// A refined copy of `story`. Epic name and source chunk never change.
    #[instrument(skip(self, story, source_text), fields(summary = %story.summary))]
    pub async fn regenerate_story(
        &self,
        story: &Story,
        source_text: &str,
    ) -> Result<Story, GenerationError> {
        let prompt = prompts::regenerate_story_prompt(story, source_text, false);
        let refined = self.story_call(&prompt, story, self.config.temperature).await?;

        if !is_echo(&refined.description, Some(&story.description)) {
            return Ok(refined);
        }

        debug!("regenerated story echoed its input, retrying with new wording");
        let prompt = prompts::regenerate_story_prompt(story, source_text, true);
        self.story_call(&prompt, story, self.config.retry_temperature).await
    }

    async fn epic_call(&self, prompt: &str, temperature: f32) -> Result<Epic, GenerationError> {
        let value = self.invoke(prompt, temperature).await?;
        let object = value
            .as_object()
            .ok_or_else(|| GenerationError::schema("regenerated epic must be a JSON object", &value))?;

        normalize_epic(object, "").ok_or_else(|| {
            GenerationError::schema("regenerated epic is missing epic_name or description", &value)
        })
    }

    async fn story_call(
        &self,
        prompt: &str,
        original: &Story,
        temperature: f32,
    ) -> Result<Story, GenerationError> {
        let value = self.invoke(prompt, temperature).await?;
        let object = value
            .as_object()
            .ok_or_else(|| GenerationError::schema("regenerated story must be a JSON object", &value))?;

        let summary = string_field(object, "summary").ok_or_else(|| {
            GenerationError::schema("regenerated story is missing summary", &value)
        })?;

        let or_original = |field: &str, fallback: &[String]| {
            let list = list_field(object, field);
            if list.is_empty() {
                fallback.to_vec()
            } else {
                list
            }
        };

        Ok(Story {
            epic_name: original.epic_name.clone(),
            summary,
            description: string_field(object, "description").unwrap_or_default(),
            acceptance_criteria: or_original("acceptance_criteria", &original.acceptance_criteria),
            definition_of_done: or_original("definition_of_done", &original.definition_of_done),
            source_chunk_id: original.source_chunk_id.clone(),
        })
    }

    async fn invoke(&self, prompt: &str, temperature: f32) -> Result<Value, GenerationError> {
        self.client
            .invoke_json(prompt, &self.config.model, self.config.max_tokens, temperature)
            .await
    }
}

/// The new description says the same thing as the previous one.
fn is_echo(description: &str, previous: Option<&str>) -> bool {
    match previous {
        Some(previous) if !previous.trim().is_empty() => {
            normalize_key(description) == normalize_key(previous)
        }
        _ => false,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::adapters::llm::ScriptedBackend;
    use crate::services::generation::{GenerationClientConfig, RetryPolicy};

    fn regenerator(backend: Arc<ScriptedBackend>) -> Regenerator {
        let client = Arc::new(GenerationClient::new(
            backend,
            RetryPolicy::none(),
            GenerationClientConfig {
                repair_with_model: false,
                ..GenerationClientConfig::default()
            },
        ));
        Regenerator::new(client, RegeneratorConfig::default())
    }

    #[tokio::test]
    async fn test_fresh_answer_returned_after_one_call() {
        let backend = Arc::new(ScriptedBackend::new(vec![Ok(
            r#"{"epic_name": "Billing", "description": "Automated invoicing for EU customers"}"#.to_string(),
        )]));
        let epic = regenerator(backend.clone())
            .regenerate_epic("reqs", "Billing", Some("Invoices"))
            .await
            .unwrap();

        assert_eq!(epic.description, "Automated invoicing for EU customers");
        assert_eq!(backend.calls(), 1);
        assert_eq!(backend.requests()[0].max_tokens, 350);
    }

    #[tokio::test]
    async fn test_echo_triggers_one_hotter_retry() {
        let backend = Arc::new(ScriptedBackend::new(vec![
            Ok(r#"{"epic_name": "Billing", "description": "  INVOICES "}"#.to_string()),
            Ok(r#"{"epic_name": "Billing", "description": "invoices"}"#.to_string()),
        ]));
        let epic = regenerator(backend.clone())
            .regenerate_epic("reqs", "Billing", Some("Invoices"))
            .await
            .unwrap();

        // The second answer is kept even though it echoes again
        assert_eq!(epic.description, "invoices");
        assert_eq!(backend.calls(), 2);

        let requests = backend.requests();
        assert!((requests[1].temperature - 0.7).abs() < f32::EPSILON);
        assert!(requests[1].prompt.contains(prompts::DIFFERENT_WORDING));
    }

    #[tokio::test]
    async fn test_epic_missing_fields_is_schema_violation() {
        let backend = Arc::new(ScriptedBackend::new(vec![Ok(r#"{"epic_name": "Billing"}"#.to_string())]));
        let err = regenerator(backend)
            .regenerate_epic("reqs", "Billing", None)
            .await
            .unwrap_err();
        assert!(matches!(err, GenerationError::SchemaViolation { .. }));

        let backend = Arc::new(ScriptedBackend::new(vec![Ok("[1, 2]".to_string())]));
        let err = regenerator(backend)
            .regenerate_epic("reqs", "Billing", None)
            .await
            .unwrap_err();
        assert!(matches!(err, GenerationError::SchemaViolation { .. }));
    }

    #[tokio::test]
    async fn test_story_keeps_epic_and_chunk() {
        let backend = Arc::new(ScriptedBackend::new(vec![Ok(r#"{
            "epic_name": "Other",
            "summary": "Pay invoice by card",
            "description": "As a customer I pay invoices by card",
            "acceptance_criteria": ["Visa and Mastercard accepted"]
        }"#
        .to_string())]));

        let mut story = Story::new("Billing", "Pay invoice");
        story.source_chunk_id = "C-1".to_string();
        story.definition_of_done = vec!["Deployed".to_string()];

        let refined = regenerator(backend)
            .regenerate_story(&story, "reqs")
            .await
            .unwrap();

        assert_eq!(refined.epic_name, "Billing");
        assert_eq!(refined.source_chunk_id, "C-1");
        assert_eq!(refined.summary, "Pay invoice by card");
        assert_eq!(refined.definition_of_done, vec!["Deployed"]);
    }

    #[tokio::test]
    async fn test_story_echo_triggers_one_hotter_retry() {
        let backend = Arc::new(ScriptedBackend::new(vec![
            Ok(r#"{"summary": "Pay invoice", "description": "  As a customer   I pay INVOICES "}"#.to_string()),
            Ok(r#"{"summary": "Pay invoice by card", "description": "Customers settle open invoices by card"}"#.to_string()),
        ]));

        let mut story = Story::new("Billing", "Pay invoice");
        story.description = "as a customer i pay invoices".to_string();
        story.source_chunk_id = "C-1".to_string();

        let refined = regenerator(backend.clone())
            .regenerate_story(&story, "reqs")
            .await
            .unwrap();

        assert_eq!(refined.description, "Customers settle open invoices by card");
        assert_eq!(refined.source_chunk_id, "C-1");
        assert_eq!(backend.calls(), 2);

        let requests = backend.requests();
        assert!((requests[0].temperature - 0.2).abs() < f32::EPSILON);
        assert!((requests[1].temperature - 0.7).abs() < f32::EPSILON);
        assert!(!requests[0].prompt.contains(prompts::DIFFERENT_WORDING));
        assert!(requests[1].prompt.contains(prompts::DIFFERENT_WORDING));
    }

    #[test]
    fn test_is_echo() {
        assert!(is_echo("Same  Words", Some("same words")));
        assert!(!is_echo("new words", Some("same words")));
        assert!(!is_echo("", None));
        assert!(!is_echo("", Some("   ")));
    }
}
