//! Embedding provider adapters.

pub mod hashing;
pub mod openai;

use std::sync::Arc;

pub use hashing::HashingEmbeddingProvider;
pub use openai::{OpenAiEmbeddingConfig, OpenAiEmbeddingProvider};

use crate::domain::errors::DomainResult;
use crate::domain::models::{EmbeddingConfig, EmbeddingProviderKind};
use crate::domain::ports::EmbeddingProvider;

/// Build the provider selected by `config.provider`.
pub fn provider_from_config(config: &EmbeddingConfig) -> DomainResult<Arc<dyn EmbeddingProvider>> {
    match config.provider {
        EmbeddingProviderKind::Hashing => {
            Ok(Arc::new(HashingEmbeddingProvider::new(config.dimension)))
        }
        EmbeddingProviderKind::Openai => Ok(Arc::new(OpenAiEmbeddingProvider::new(
            OpenAiEmbeddingConfig::from(config),
        )?)),
    }
}
