pub mod chunker;
pub mod code_generator;
pub mod content_cache;
pub mod duplicate_detector;
pub mod embedding_service;
pub mod epic_generator;
pub mod epic_reducer;
pub mod generation;
pub mod normalize;
pub mod pipeline;
pub mod prompts;
pub mod regeneration;
pub mod retriever;
pub mod story_generator;
pub mod story_reducer;

pub use chunker::Chunker;
pub use code_generator::{CodeGenerator, CodeGeneratorConfig};
pub use content_cache::ContentCache;
pub use duplicate_detector::{detect_duplicates, DuplicateService, DuplicateServiceConfig};
pub use embedding_service::{EmbeddingMatrix, EmbeddingService};
pub use epic_generator::{EpicGenerator, EpicGeneratorConfig};
pub use epic_reducer::merge_epics;
pub use generation::{GenerationClient, GenerationClientConfig, GenerationError, RetryPolicy};
pub use pipeline::{EpicPipeline, PipelineError, StoryPipeline};
pub use regeneration::{Regenerator, RegeneratorConfig};
pub use retriever::Retriever;
pub use story_generator::{StoryGenerator, StoryGeneratorConfig};
pub use story_reducer::merge_stories;
