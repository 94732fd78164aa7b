//! Service wiring shared by the CLI and the HTTP server.

use std::sync::Arc;
use tracing::info;

use crate::adapters::embeddings::provider_from_config;
use crate::adapters::jira::JiraClient;
use crate::adapters::llm::{OpenAiCompatBackend, OpenAiCompatConfig};
use crate::domain::errors::DomainResult;
use crate::domain::models::Config;
use crate::domain::ports::{EmbeddingProvider, IssueTracker, LlmBackend};
use crate::services::{
    Chunker, CodeGenerator, CodeGeneratorConfig, ContentCache, DuplicateService,
    DuplicateServiceConfig, EmbeddingService, EpicGenerator, EpicGeneratorConfig, EpicPipeline,
    GenerationClient, GenerationClientConfig, Regenerator, RegeneratorConfig, Retriever,
    RetryPolicy, StoryGenerator, StoryGeneratorConfig, StoryPipeline,
};

/// Every storyforge operation, built once from a [`Config`].
pub struct Storyforge {
    pub config: Config,
    pub chunker: Chunker,
    pub epics: EpicPipeline,
    pub stories: StoryPipeline,
    pub regenerator: Regenerator,
    pub code_generator: CodeGenerator,
    pub duplicates: DuplicateService,
    pub tracker: Arc<dyn IssueTracker>,
}

impl Storyforge {
    /// Build with the configured HTTP backends.
    pub fn from_config(config: Config) -> DomainResult<Self> {
        let llm: Arc<dyn LlmBackend> =
            Arc::new(OpenAiCompatBackend::new(OpenAiCompatConfig::from(&config.llm))?);
        let embedder = provider_from_config(&config.embedding)?;
        let tracker: Arc<dyn IssueTracker> = Arc::new(JiraClient::new(&config.tracker)?);

        info!(
            model = %config.llm.model,
            embedder = embedder.name(),
            "storyforge services ready"
        );
        Self::with_backends(config, llm, embedder, tracker)
    }

    /// Build around caller-supplied backends.
    pub fn with_backends(
        config: Config,
        llm: Arc<dyn LlmBackend>,
        embedder: Arc<dyn EmbeddingProvider>,
        tracker: Arc<dyn IssueTracker>,
    ) -> DomainResult<Self> {
        let chunker = Chunker::with_config(&config.chunking)?;
        let capacity = config.retrieval.cache_capacity;

        let embeddings = Arc::new(EmbeddingService::new(
            embedder,
            config.embedding.cache_capacity,
        ));
        let retriever = Arc::new(Retriever::new(embeddings, ContentCache::new(capacity)));

        let client = Arc::new(GenerationClient::new(
            llm,
            RetryPolicy::from_config(&config.retry),
            GenerationClientConfig::from(&config.llm),
        ));

        let epic_generator = Arc::new(EpicGenerator::new(
            client.clone(),
            ContentCache::new(capacity),
            EpicGeneratorConfig::from(&config.llm),
        ));
        let story_generator = Arc::new(StoryGenerator::new(
            client.clone(),
            ContentCache::new(capacity),
            StoryGeneratorConfig::from(&config.llm),
        ));

        Ok(Self {
            chunker,
            epics: EpicPipeline::new(retriever.clone(), epic_generator, &config.retrieval),
            stories: StoryPipeline::new(retriever, story_generator, &config.retrieval),
            regenerator: Regenerator::new(client.clone(), RegeneratorConfig::from(&config.llm)),
            code_generator: CodeGenerator::new(client, CodeGeneratorConfig::from(&config.llm)),
            duplicates: DuplicateService::new(
                tracker.clone(),
                DuplicateServiceConfig::new(&config.duplicates, &config.tracker),
            ),
            tracker,
            config,
        })
    }
}
