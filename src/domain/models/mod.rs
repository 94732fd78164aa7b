pub mod chunk;
pub mod codegen;
pub mod config;
pub mod epic;
pub mod issue;
pub mod story;
pub mod text;

pub use chunk::Chunk;
pub use codegen::{sanitize_relative_path, GeneratedFiles, TechStack};
pub use config::{
    ChunkingConfig, Config, DuplicatesConfig, EmbeddingConfig, EmbeddingProviderKind, LlmConfig,
    LoggingConfig, RetrievalConfig, RetryConfig, ServerConfig, TrackerConfig,
};
pub use epic::{Epic, EpicKey, EpicScope};
pub use issue::{DuplicateMatch, ExistingIssue, TrackerHealth};
pub use story::{Story, StoryKey};
pub use text::normalize_key;
