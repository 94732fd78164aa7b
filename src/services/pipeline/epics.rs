use std::sync::Arc;
use tracing::{info, instrument, warn};

use super::PipelineError;
use crate::domain::models::{Chunk, Epic, RetrievalConfig};
use crate::services::epic_generator::EpicGenerator;
use crate::services::epic_reducer::merge_epics;
use crate::services::retriever::Retriever;

/// Retriever, then epic generation per selected chunk, then merge.
pub struct EpicPipeline {
    retriever: Arc<Retriever>,
    generator: Arc<EpicGenerator>,
    default_query: String,
    default_top_k: usize,
}

impl EpicPipeline {
    pub fn new(
        retriever: Arc<Retriever>,
        generator: Arc<EpicGenerator>,
        config: &RetrievalConfig,
    ) -> Self {
        Self {
            retriever,
            generator,
            default_query: config.epic_query.clone(),
            default_top_k: config.epic_top_k,
        }
    }

    /// Merged epics for the chunks most relevant to `query`.
    ///
    /// Chunks whose generation fails are skipped. If every selected chunk
    /// fails the run fails with [`PipelineError::AllChunksFailed`].
    #[instrument(skip(self, chunks), fields(chunks = chunks.len()))]
    pub async fn generate_epics_from_requirements(
        &self,
        chunks: &[Chunk],
        query: Option<&str>,
        top_k: Option<usize>,
    ) -> Result<Vec<Epic>, PipelineError> {
        if chunks.is_empty() {
            return Ok(Vec::new());
        }

        let query = query
            .filter(|q| !q.trim().is_empty())
            .unwrap_or(self.default_query.as_str());
        let top_k = top_k.unwrap_or(self.default_top_k);

        let selected = self.retriever.retrieve_top_k(chunks, query, top_k).await?;

        let mut candidates = Vec::new();
        let mut failures = 0;
        let mut last_error = None;

        for chunk in &selected {
            match self.generator.generate_epics_from_chunk(chunk).await {
                Ok(epics) => candidates.extend(epics),
                Err(err) => {
                    warn!(chunk_id = %chunk.chunk_id, error = %err, "skipping chunk after epic generation failure");
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

        let candidate_count = candidates.len();
        let epics = merge_epics(candidates);
        info!(
            selected = selected.len(),
            failed = failures,
            candidates = candidate_count,
            epics = epics.len(),
            "epic pipeline finished"
        );
        Ok(epics)
    }
}
