//! Epic generation for a single chunk (the MAP step).

use serde_json::{Map, Value};
use std::sync::Arc;
use tracing::{debug, instrument};

use crate::domain::models::text::extend_unique;
use crate::domain::models::{Chunk, Epic, EpicScope, LlmConfig};
use crate::services::content_cache::ContentCache;
use crate::services::generation::{GenerationClient, GenerationError};
use crate::services::normalize::{list_field, record_array, string_field};
use crate::services::prompts;

/// Per-chunk cache key: chunk id plus a short digest of the chunk text.
pub type EpicCacheKey = (String, String);

/// Model parameters for epic generation.
#[derive(Debug, Clone)]
pub struct EpicGeneratorConfig {
    pub model: String,
    pub max_tokens: u32,
    pub temperature: f32,
}

impl Default for EpicGeneratorConfig {
    fn default() -> Self {
        Self::from(&LlmConfig::default())
    }
}

impl From<&LlmConfig> for EpicGeneratorConfig {
    fn from(config: &LlmConfig) -> Self {
        Self {
            model: config.model.clone(),
            max_tokens: config.epic_max_tokens,
            temperature: config.temperature,
        }
    }
}

/// Produces candidate epics from one chunk.
pub struct EpicGenerator {
    client: Arc<GenerationClient>,
    cache: ContentCache<EpicCacheKey, Vec<Epic>>,
    config: EpicGeneratorConfig,
}

impl EpicGenerator {
    pub fn new(
        client: Arc<GenerationClient>,
        cache: ContentCache<EpicCacheKey, Vec<Epic>>,
        config: EpicGeneratorConfig,
    ) -> Self {
        Self {
            client,
            cache,
            config,
        }
    }

    /// Candidate epics for `chunk`, each tagged with the chunk id.
    ///
    /// Results are memoized per chunk id and text digest; a hit skips the model.
    #[instrument(skip(self, chunk), fields(chunk_id = %chunk.chunk_id))]
    pub async fn generate_epics_from_chunk(
        &self,
        chunk: &Chunk,
    ) -> Result<Vec<Epic>, GenerationError> {
        let key = (chunk.chunk_id.clone(), chunk.text_hash());
        if let Some(cached) = self.cache.get(&key) {
            debug!("epic cache hit");
            return Ok(cached.as_ref().clone());
        }

        let prompt = prompts::epic_generation_prompt(chunk);
        let value = self
            .client
            .invoke_json(
                &prompt,
                &self.config.model,
                self.config.max_tokens,
                self.config.temperature,
            )
            .await?;

        let epics = normalize_epics(&value, &chunk.chunk_id)?;
        debug!(candidates = epics.len(), "epics generated");
        Ok(self.cache.insert(key, epics).as_ref().clone())
    }
}

/// Turn model JSON into validated candidate epics from `chunk_id`.
///
/// Accepts `{"epics": [...]}` or a bare array. Non-object items and items
/// without a name or description are dropped.
pub fn normalize_epics(value: &Value, chunk_id: &str) -> Result<Vec<Epic>, GenerationError> {
    let items = record_array(value, "epics")
        .map_err(|e| GenerationError::schema(e.to_string(), value))?;

    let mut epics = Vec::with_capacity(items.len());
    for item in items {
        let Some(object) = item.as_object() else {
            debug!(chunk_id, "dropping non-object epic candidate");
            continue;
        };
        match normalize_epic(object, chunk_id) {
            Some(epic) => epics.push(epic),
            None => debug!(chunk_id, "dropping epic candidate without name or description"),
        }
    }

    Ok(epics)
}

/// One epic object, or `None` if `epic_name` or `description` is missing.
pub(crate) fn normalize_epic(object: &Map<String, Value>, chunk_id: &str) -> Option<Epic> {
    let epic_name = string_field(object, "epic_name")?;
    let description = string_field(object, "description")?;

    let scope = match object.get("scope").and_then(Value::as_object) {
        Some(scope) => EpicScope {
            in_scope: list_field(scope, "in_scope"),
            out_of_scope: list_field(scope, "out_of_scope"),
        },
        None => EpicScope::default(),
    };

    let mut source_chunk_ids = Vec::new();
    if !chunk_id.is_empty() {
        source_chunk_ids.push(chunk_id.to_string());
    }
    extend_unique(&mut source_chunk_ids, &list_field(object, "source_chunk_ids"));

    Some(Epic {
        epic_name,
        description,
        summary: string_field(object, "summary"),
        business_objectives: list_field(object, "business_objectives"),
        scope,
        acceptance_criteria: list_field(object, "acceptance_criteria"),
        definition_of_done: list_field(object, "definition_of_done"),
        covered_requirements: list_field(object, "covered_requirements"),
        source_chunk_ids,
        assumptions: joined_field(object, "assumptions"),
    })
}

/// A scalar or a list of scalars, list items joined with "; ".
fn joined_field(object: &Map<String, Value>, key: &str) -> Option<String> {
    let items = list_field(object, key);
    (!items.is_empty()).then(|| items.join("; "))
}
