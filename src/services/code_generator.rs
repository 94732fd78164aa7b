//! Source scaffolding for a story in one of the supported stacks.

use serde_json::Value;
use std::sync::Arc;
use tracing::{debug, instrument};

use crate::domain::models::{sanitize_relative_path, GeneratedFiles, LlmConfig, Story, TechStack};
use crate::services::generation::{GenerationClient, GenerationError};
use crate::services::prompts;

#[derive(Debug, Clone)]
pub struct CodeGeneratorConfig {
    pub model: String,
    pub max_tokens: u32,
    pub temperature: f32,
}

impl Default for CodeGeneratorConfig {
    fn default() -> Self {
        Self::from(&LlmConfig::default())
    }
}

impl From<&LlmConfig> for CodeGeneratorConfig {
    fn from(config: &LlmConfig) -> Self {
        Self {
            model: config.model.clone(),
            max_tokens: config.codegen_max_tokens,
            temperature: config.temperature,
        }
    }
}

pub struct CodeGenerator {
    client: Arc<GenerationClient>,
    config: CodeGeneratorConfig,
}

impl CodeGenerator {
    pub fn new(client: Arc<GenerationClient>, config: CodeGeneratorConfig) -> Self {
        Self { client, config }
    }

    /// Files implementing `story` in the stack named by `stack_key`.
    ///
    /// An unknown stack fails before the model is called.
    #[instrument(skip(self, story), fields(summary = %story.summary))]
    pub async fn generate_code_for_story(
        &self,
        story: &Story,
        stack_key: &str,
    ) -> Result<GeneratedFiles, GenerationError> {
        let stack: TechStack = stack_key
            .parse()
            .map_err(GenerationError::UnsupportedStack)?;

        let prompt = prompts::code_generation_prompt(story, stack);
        let value = self
            .client
            .invoke_json(
                &prompt,
                &self.config.model,
                self.config.max_tokens,
                self.config.temperature,
            )
            .await?;

        let files = normalize_files(&value)?;
        debug!(stack = %stack, files = files.len(), "code generated");
        Ok(files)
    }
}

/// Keep the files with a safe relative path and string contents.
pub fn normalize_files(value: &Value) -> Result<GeneratedFiles, GenerationError> {
    let entries = value
        .get("files")
        .and_then(Value::as_object)
        .ok_or_else(|| GenerationError::schema("expected an object under \"files\"", value))?;

    let mut files = GeneratedFiles::new();
    for (raw_path, contents) in entries {
        let Some(path) = sanitize_relative_path(raw_path) else {
            debug!(path = %raw_path, "dropping generated file with unsafe path");
            continue;
        };
        let Some(contents) = contents.as_str() else {
            debug!(path = %raw_path, "dropping generated file with non-string contents");
            continue;
        };
        files.insert(path, contents.to_string());
    }

    if files.is_empty() {
        return Err(GenerationError::schema("no valid generated files", value));
    }
    Ok(files)
}
