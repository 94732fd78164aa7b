//! Retrieval-scoped generation pipelines.
//!
//! Both pipelines share one policy: retrieve the top chunks, run the MAP
//! step over them one at a time, skip chunks that fail, reduce the rest.

pub mod epics;
pub mod stories;

use thiserror::Error;

use crate::domain::errors::DomainError;
use crate::services::generation::GenerationError;

pub use epics::EpicPipeline;
pub use stories::StoryPipeline;

/// Errors from a pipeline run.
#[derive(Error, Debug)]
pub enum PipelineError {
    /// Embedding or ranking failed before any generation.
    #[error("Retrieval failed: {0}")]
    Retrieval(#[from] DomainError),

    /// Every selected chunk failed; `last_error` is the final failure.
    #[error("All {attempted} selected chunks failed; last error: {last_error}")]
    AllChunksFailed {
        attempted: usize,
        last_error: GenerationError,
    },
}
