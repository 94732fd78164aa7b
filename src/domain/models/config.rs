use serde::{Deserialize, Serialize};

/// Main configuration structure for storyforge
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub struct Config {
    /// Generation backend configuration
    #[serde(default)]
    pub llm: LlmConfig,

    /// Embedding backend configuration
    #[serde(default)]
    pub embedding: EmbeddingConfig,

    /// Chunker configuration
    #[serde(default)]
    pub chunking: ChunkingConfig,

    /// Retrieval configuration
    #[serde(default)]
    pub retrieval: RetrievalConfig,

    /// Retry policy configuration
    #[serde(default)]
    pub retry: RetryConfig,

    /// Issue tracker configuration
    #[serde(default)]
    pub tracker: TrackerConfig,

    /// Duplicate detection configuration
    #[serde(default)]
    pub duplicates: DuplicatesConfig,

    /// HTTP server configuration
    #[serde(default)]
    pub server: ServerConfig,

    /// Logging configuration
    #[serde(default)]
    pub logging: LoggingConfig,
}

/// Generation backend (OpenAI-compatible chat completions)
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub struct LlmConfig {
    /// Base URL of the chat completions API
    #[serde(default = "default_llm_base_url")]
    pub base_url: String,

    /// API key; falls back to `GROQ_API_KEY` when unset
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub api_key: Option<String>,

    /// Model used for every generation prompt
    #[serde(default = "default_llm_model")]
    pub model: String,

    /// Token budget for epic generation
    #[serde(default = "default_epic_max_tokens")]
    pub epic_max_tokens: u32,

    /// Token budget for story generation
    #[serde(default = "default_story_max_tokens")]
    pub story_max_tokens: u32,

    /// Token budget for single-record regeneration
    #[serde(default = "default_regenerate_max_tokens")]
    pub regenerate_max_tokens: u32,

    /// Token budget for code generation
    #[serde(default = "default_codegen_max_tokens")]
    pub codegen_max_tokens: u32,

    /// Base sampling temperature
    #[serde(default = "default_temperature")]
    pub temperature: f32,

    /// Temperature used when a regeneration echoed its input
    #[serde(default = "default_regeneration_retry_temperature")]
    pub regeneration_retry_temperature: f32,

    /// Request timeout in seconds
    #[serde(default = "default_llm_timeout_secs")]
    pub timeout_secs: u64,

    /// Model-name suffixes that accept `response_format: json_object`
    #[serde(default = "default_json_mode_models")]
    pub json_mode_models: Vec<String>,

    /// Ask the model to repair unparseable output once before failing
    #[serde(default = "default_true")]
    pub repair_with_model: bool,
}

fn default_llm_base_url() -> String {
    "https://api.groq.com/openai/v1".to_string()
}

fn default_llm_model() -> String {
    "llama-3.1-8b-instant".to_string()
}

const fn default_epic_max_tokens() -> u32 {
    650
}

const fn default_story_max_tokens() -> u32 {
    900
}

const fn default_regenerate_max_tokens() -> u32 {
    350
}

const fn default_codegen_max_tokens() -> u32 {
    4096
}

const fn default_temperature() -> f32 {
    0.2
}

const fn default_regeneration_retry_temperature() -> f32 {
    0.7
}

const fn default_llm_timeout_secs() -> u64 {
    60
}

fn default_json_mode_models() -> Vec<String> {
    vec!["8b-instant".to_string()]
}

const fn default_true() -> bool {
    true
}

impl Default for LlmConfig {
    fn default() -> Self {
        Self {
            base_url: default_llm_base_url(),
            api_key: None,
            model: default_llm_model(),
            epic_max_tokens: default_epic_max_tokens(),
            story_max_tokens: default_story_max_tokens(),
            regenerate_max_tokens: default_regenerate_max_tokens(),
            codegen_max_tokens: default_codegen_max_tokens(),
            temperature: default_temperature(),
            regeneration_retry_temperature: default_regeneration_retry_temperature(),
            timeout_secs: default_llm_timeout_secs(),
            json_mode_models: default_json_mode_models(),
            repair_with_model: default_true(),
        }
    }
}

/// Which embedding provider backs retrieval
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EmbeddingProviderKind {
    /// Local deterministic feature hashing, no network
    Hashing,
    /// OpenAI-compatible `/embeddings` endpoint
    Openai,
}

/// Embedding backend configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub struct EmbeddingConfig {
    #[serde(default = "default_embedding_provider")]
    pub provider: EmbeddingProviderKind,

    #[serde(default = "default_embedding_base_url")]
    pub base_url: String,

    /// API key; falls back to `OPENAI_API_KEY` when unset
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub api_key: Option<String>,

    #[serde(default = "default_embedding_model")]
    pub model: String,

    /// Vector width produced by the provider
    #[serde(default = "default_embedding_dimension")]
    pub dimension: usize,

    #[serde(default = "default_embedding_timeout_secs")]
    pub timeout_secs: u64,

    #[serde(default = "default_embedding_batch_size")]
    pub max_batch_size: usize,

    /// Maximum memoized text vectors
    #[serde(default = "default_embedding_cache_capacity")]
    pub cache_capacity: u64,
}

const fn default_embedding_provider() -> EmbeddingProviderKind {
    EmbeddingProviderKind::Hashing
}

fn default_embedding_base_url() -> String {
    "https://api.openai.com/v1".to_string()
}

fn default_embedding_model() -> String {
    "text-embedding-3-small".to_string()
}

const fn default_embedding_dimension() -> usize {
    384
}

const fn default_embedding_timeout_secs() -> u64 {
    30
}

const fn default_embedding_batch_size() -> usize {
    256
}

const fn default_embedding_cache_capacity() -> u64 {
    4096
}

impl Default for EmbeddingConfig {
    fn default() -> Self {
        Self {
            provider: default_embedding_provider(),
            base_url: default_embedding_base_url(),
            api_key: None,
            model: default_embedding_model(),
            dimension: default_embedding_dimension(),
            timeout_secs: default_embedding_timeout_secs(),
            max_batch_size: default_embedding_batch_size(),
            cache_capacity: default_embedding_cache_capacity(),
        }
    }
}

/// Chunker configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub struct ChunkingConfig {
    /// Maximum lines per chunk
    #[serde(default = "default_max_lines")]
    pub max_lines: usize,

    /// First words that open a new chunk
    #[serde(default = "default_heading_keywords")]
    pub heading_keywords: Vec<String>,
}

const fn default_max_lines() -> usize {
    5
}

fn default_heading_keywords() -> Vec<String> {
    vec!["epic".to_string(), "module".to_string(), "feature".to_string()]
}

impl Default for ChunkingConfig {
    fn default() -> Self {
        Self {
            max_lines: default_max_lines(),
            heading_keywords: default_heading_keywords(),
        }
    }
}

/// Retrieval configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub struct RetrievalConfig {
    /// Query used to pick chunks for epic generation
    #[serde(default = "default_epic_query")]
    pub epic_query: String,

    #[serde(default = "default_epic_top_k")]
    pub epic_top_k: usize,

    #[serde(default = "default_story_top_k")]
    pub story_top_k: usize,

    /// Maximum memoized rankings and generation results
    #[serde(default = "default_cache_capacity")]
    pub cache_capacity: u64,
}

fn default_epic_query() -> String {
    "high level business capabilities".to_string()
}

const fn default_epic_top_k() -> usize {
    5
}

const fn default_story_top_k() -> usize {
    4
}

const fn default_cache_capacity() -> u64 {
    512
}

impl Default for RetrievalConfig {
    fn default() -> Self {
        Self {
            epic_query: default_epic_query(),
            epic_top_k: default_epic_top_k(),
            story_top_k: default_story_top_k(),
            cache_capacity: default_cache_capacity(),
        }
    }
}

/// Retry policy configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub struct RetryConfig {
    /// Total attempts, including the first one
    #[serde(default = "default_max_attempts")]
    pub max_attempts: u32,

    /// Initial backoff delay in milliseconds
    #[serde(default = "default_initial_backoff_ms")]
    pub initial_backoff_ms: u64,

    /// Maximum backoff delay in milliseconds
    #[serde(default = "default_max_backoff_ms")]
    pub max_backoff_ms: u64,
}

const fn default_max_attempts() -> u32 {
    4
}

const fn default_initial_backoff_ms() -> u64 {
    1000
}

const fn default_max_backoff_ms() -> u64 {
    30_000
}

impl Default for RetryConfig {
    fn default() -> Self {
        Self {
            max_attempts: default_max_attempts(),
            initial_backoff_ms: default_initial_backoff_ms(),
            max_backoff_ms: default_max_backoff_ms(),
        }
    }
}

/// Issue tracker (Jira) configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub struct TrackerConfig {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub url: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub api_token: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub project_key: Option<String>,

    /// Window for the duplicate lookup, in days
    #[serde(default = "default_lookback_days")]
    pub lookback_days: u32,

    /// Maximum issues fetched for the duplicate lookup
    #[serde(default = "default_max_results")]
    pub max_results: u32,

    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,
}

const fn default_lookback_days() -> u32 {
    90
}

const fn default_max_results() -> u32 {
    50
}

const fn default_timeout_secs() -> u64 {
    30
}

impl Default for TrackerConfig {
    fn default() -> Self {
        Self {
            url: None,
            email: None,
            api_token: None,
            project_key: None,
            lookback_days: default_lookback_days(),
            max_results: default_max_results(),
            timeout_secs: default_timeout_secs(),
        }
    }
}

/// Duplicate detection configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub struct DuplicatesConfig {
    /// Minimum similarity reported as a duplicate
    #[serde(default = "default_threshold")]
    pub threshold: f64,
}

const fn default_threshold() -> f64 {
    0.75
}

impl Default for DuplicatesConfig {
    fn default() -> Self {
        Self {
            threshold: default_threshold(),
        }
    }
}

/// HTTP server configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub struct ServerConfig {
    #[serde(default = "default_host")]
    pub host: String,

    #[serde(default = "default_port")]
    pub port: u16,

    #[serde(default = "default_true")]
    pub enable_cors: bool,
}

fn default_host() -> String {
    "127.0.0.1".to_string()
}

const fn default_port() -> u16 {
    8000
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
            enable_cors: default_true(),
        }
    }
}

/// Logging configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub struct LoggingConfig {
    /// Log level: trace, debug, info, warn, error
    #[serde(default = "default_log_level")]
    pub level: String,

    /// Log format: json or pretty
    #[serde(default = "default_log_format")]
    pub format: String,

    /// Directory for rotated log files; stderr only when unset
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub log_dir: Option<String>,

    /// Rotation: daily, hourly or never
    #[serde(default = "default_rotation")]
    pub rotation: String,
}

fn default_log_level() -> String {
    "info".to_string()
}

fn default_log_format() -> String {
    "pretty".to_string()
}

fn default_rotation() -> String {
    "daily".to_string()
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
            format: default_log_format(),
            log_dir: None,
            rotation: default_rotation(),
        }
    }
}
