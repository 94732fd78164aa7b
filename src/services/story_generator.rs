//! Story generation for one (epic, chunk) pair.

use serde_json::Value;
use std::sync::Arc;
use tracing::{debug, instrument};

use crate::domain::models::{Chunk, Epic, EpicKey, LlmConfig, Story};
use crate::services::content_cache::ContentCache;
use crate::services::generation::{GenerationClient, GenerationError};
use crate::services::normalize::{list_field, record_array, string_field};
use crate::services::prompts;

/// Cache key: owning epic, chunk id and chunk text digest.
pub type StoryCacheKey = (EpicKey, String, String);

/// Model parameters for story generation.
#[derive(Debug, Clone)]
pub struct StoryGeneratorConfig {
    pub model: String,
    pub max_tokens: u32,
    pub temperature: f32,
}

impl Default for StoryGeneratorConfig {
    fn default() -> Self {
        Self::from(&LlmConfig::default())
    }
}

impl From<&LlmConfig> for StoryGeneratorConfig {
    fn from(config: &LlmConfig) -> Self {
        Self {
            model: config.model.clone(),
            max_tokens: config.story_max_tokens,
            temperature: config.temperature,
        }
    }
}

/// Produces candidate stories for one epic from one chunk.
pub struct StoryGenerator {
    client: Arc<GenerationClient>,
    cache: ContentCache<StoryCacheKey, Vec<Story>>,
    config: StoryGeneratorConfig,
}

impl StoryGenerator {
    pub fn new(
        client: Arc<GenerationClient>,
        cache: ContentCache<StoryCacheKey, Vec<Story>>,
        config: StoryGeneratorConfig,
    ) -> Self {
        Self {
            client,
            cache,
            config,
        }
    }

    #[instrument(skip(self, epic, chunk), fields(epic = %epic.epic_name, chunk_id = %chunk.chunk_id))]
    pub async fn generate_stories_from_chunk(
        &self,
        epic: &Epic,
        chunk: &Chunk,
    ) -> Result<Vec<Story>, GenerationError> {
        let key = (epic.key(), chunk.chunk_id.clone(), chunk.text_hash());
        if let Some(cached) = self.cache.get(&key) {
            debug!("story cache hit");
            return Ok(cached.as_ref().clone());
        }

        let prompt = prompts::story_generation_prompt(epic, chunk);
        let value = self
            .client
            .invoke_json(
                &prompt,
                &self.config.model,
                self.config.max_tokens,
                self.config.temperature,
            )
            .await?;

        let stories = normalize_stories(&value, &epic.epic_name, &chunk.chunk_id)?;
        debug!(candidates = stories.len(), "stories generated");
        Ok(self.cache.insert(key, stories).as_ref().clone())
    }
}

/// Turn model JSON into stories owned by `epic_name` and sourced from `chunk_id`.
///
/// Whatever epic or chunk the model claims is overwritten.
pub fn normalize_stories(
    value: &Value,
    epic_name: &str,
    chunk_id: &str,
) -> Result<Vec<Story>, GenerationError> {
    let items = record_array(value, "stories")
        .map_err(|e| GenerationError::schema(e.to_string(), value))?;

    let mut stories = Vec::with_capacity(items.len());
    for item in items {
        let Some(object) = item.as_object() else {
            debug!(chunk_id, "dropping non-object story candidate");
            continue;
        };
        let Some(summary) = string_field(object, "summary") else {
            debug!(chunk_id, "dropping story candidate without summary");
            continue;
        };

        stories.push(Story {
            epic_name: epic_name.trim().to_string(),
            summary,
            description: string_field(object, "description").unwrap_or_default(),
            acceptance_criteria: list_field(object, "acceptance_criteria"),
            definition_of_done: list_field(object, "definition_of_done"),
            source_chunk_id: chunk_id.to_string(),
        });
    }

    Ok(stories)
}
