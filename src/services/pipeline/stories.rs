use std::sync::Arc;
use tracing::{info, instrument, warn};

use super::PipelineError;
use crate::domain::models::{Chunk, Epic, RetrievalConfig, Story};
use crate::services::retriever::Retriever;
use crate::services::story_generator::StoryGenerator;
use crate::services::story_reducer::merge_stories;

/// Retriever keyed on the epic name, then story generation, then merge.
pub struct StoryPipeline {
    retriever: Arc<Retriever>,
    generator: Arc<StoryGenerator>,
    default_top_k: usize,
}

impl StoryPipeline {
    pub fn new(
        retriever: Arc<Retriever>,
        generator: Arc<StoryGenerator>,
        config: &RetrievalConfig,
    ) -> Self {
        Self {
            retriever,
            generator,
            default_top_k: config.story_top_k,
        }
    }

    /// Merged stories for `epic` from the chunks most relevant to its name.
    #[instrument(skip(self, epic, chunks), fields(epic = %epic.epic_name, chunks = chunks.len()))]
    pub async fn generate_stories_for_epic(
        &self,
        epic: &Epic,
        chunks: &[Chunk],
        top_k: Option<usize>,
    ) -> Result<Vec<Story>, PipelineError> {
        if chunks.is_empty() {
            return Ok(Vec::new());
        }

        let top_k = top_k.unwrap_or(self.default_top_k);
        let selected = self
            .retriever
            .retrieve_top_k(chunks, &epic.epic_name, top_k)
            .await?;

        let mut candidates = Vec::new();
        let mut failures = 0;
        let mut last_error = None;

        for chunk in &selected {
            match self.generator.generate_stories_from_chunk(epic, chunk).await {
                Ok(stories) => candidates.extend(stories),
                Err(err) => {
                    warn!(chunk_id = %chunk.chunk_id, error = %err, "skipping chunk after story generation failure");
                    failures += 1;
                    last_error = Some(err);
                }
            }
        }

        if let Some(last_error) = last_error.filter(|_| failures == selected.len()) {
            return Err(PipelineError::AllChunksFailed {
                attempted: selected.len(),
                last_error,
            });
        }

        let stories = merge_stories(candidates);
        info!(
            selected = selected.len(),
            failed = failures,
            stories = stories.len(),
            "story pipeline finished"
        );
        Ok(stories)
    }
}
