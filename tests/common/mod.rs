//! Shared fixtures for integration tests.

#![allow(dead_code)]

use serde_json::json;
use std::sync::Arc;

use storyforge::adapters::embeddings::HashingEmbeddingProvider;
use storyforge::adapters::jira::{JiraClient, JiraSettings};
use storyforge::adapters::llm::ScriptedBackend;
use storyforge::domain::models::Config;
use storyforge::domain::ports::{CompletionRequest, IssueTracker, LlmError};
use storyforge::Storyforge;

/// Two feature areas, two chunks under the default chunker.
pub const TWO_AREA_REQUIREMENTS: &str = "Billing:
Send invoices monthly
Refund failed payments

Accounts:
Users can sign up
Users can reset passwords
";

/// Config with fast retries and no model-side JSON repair.
pub fn test_config() -> Config {
    let mut config = Config::default();
    config.retry.initial_backoff_ms = 1;
    config.retry.max_backoff_ms = 2;
    config.llm.repair_with_model = false;
    config
}

/// A tracker with no settings at all.
pub fn unconfigured_tracker() -> Arc<dyn IssueTracker> {
    Arc::new(JiraClient::with_settings(JiraSettings::default(), 5).unwrap())
}

/// Build the app around a scripted backend and the local embedder.
pub fn app_with(backend: Arc<ScriptedBackend>, tracker: Arc<dyn IssueTracker>) -> Storyforge {
    Storyforge::with_backends(
        test_config(),
        backend,
        Arc::new(HashingEmbeddingProvider::new(64)),
        tracker,
    )
    .unwrap()
}

/// Lines that follow `marker` in a prompt, up to the first blank line.
fn section_after<'a>(prompt: &'a str, marker: &str) -> Vec<&'a str> {
    prompt
        .split_once(marker)
        .map(|(_, rest)| {
            rest.lines()
                .skip(1)
                .take_while(|line| !line.trim().is_empty())
                .collect()
        })
        .unwrap_or_default()
}

fn chunk_id_in(prompt: &str, marker: &str) -> String {
    prompt
        .split_once(marker)
        .and_then(|(_, rest)| rest.split(|c: char| c == ')' || c == '\n').next())
        .unwrap_or_default()
        .trim()
        .to_string()
}

/// Answers epic and story prompts from the chunk text they carry.
///
/// Each chunk yields one epic named after its heading plus a shared
/// "Platform Foundations" epic, so merging has something to collapse.
pub fn grounded_responder(request: &CompletionRequest) -> Result<String, LlmError> {
    let prompt = request.prompt.as_str();

    if prompt.contains("Chunk ID:") {
        let lines = section_after(prompt, "Requirements:");
        let heading = lines.first().map_or("General", |l| l.trim_end_matches(':'));
        let requirements: Vec<&str> = lines.iter().skip(1).copied().collect();
        let chunk_id = chunk_id_in(prompt, "Chunk ID:");

        return Ok(json!({
            "epics": [
                {
                    "epic_name": format!("{heading} Management"),
                    "description": format!("Everything about {}", heading.to_lowercase()),
                    "covered_requirements": requirements,
                    "source_chunk_ids": [chunk_id],
                },
                {
                    "epic_name": "Platform Foundations",
                    "description": format!("Shared concerns seen in {heading}"),
                    "covered_requirements": [requirements.first().copied().unwrap_or_default()],
                }
            ]
        })
        .to_string());
    }

    if prompt.contains("Requirement chunk (") {
        let lines = section_after(prompt, "Requirement chunk (");
        let stories: Vec<_> = lines
            .iter()
            .filter(|line| !line.ends_with(':'))
            .map(|line| {
                json!({
                    "summary": line,
                    "description": format!("As a user, {}", line.to_lowercase()),
                    "acceptance_criteria": [format!("{line} works")],
                    "definition_of_done": ["Reviewed"],
                })
            })
            .collect();
        return Ok(json!({ "stories": stories }).to_string());
    }

    Err(LlmError::InvalidRequest("unexpected prompt".to_string()))
}
