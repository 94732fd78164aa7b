use anyhow::{Context, Result};
use figment::providers::{Env, Format, Serialized, Yaml};
use figment::Figment;
use std::path::Path;
use thiserror::Error;

use crate::domain::models::config::Config;

/// Project directory holding configuration files.
pub const CONFIG_DIR: &str = ".storyforge";

/// Prefix of environment overrides; nested keys use `__`.
pub const ENV_PREFIX: &str = "STORYFORGE_";

/// Configuration error types
#[derive(Error, Debug, PartialEq)]
pub enum ConfigError {
    #[error("Invalid chunking.max_lines: {0}. Must be at least 1")]
    InvalidMaxLines(usize),

    #[error("Invalid {field}: {value}. Must be at least 1")]
    InvalidTopK { field: &'static str, value: usize },

    #[error("Invalid duplicates.threshold: {0}. Must be between 0 and 1")]
    InvalidThreshold(f64),

    #[error("Invalid {field}: {value}. Must be between 0 and 2")]
    InvalidTemperature { field: &'static str, value: f32 },

    #[error("Invalid log level: {0}. Must be one of: trace, debug, info, warn, error")]
    InvalidLogLevel(String),

    #[error("Invalid log format: {0}. Must be one of: json, pretty")]
    InvalidLogFormat(String),

    #[error("Invalid log rotation: {0}. Must be one of: daily, hourly, never")]
    InvalidRotation(String),

    #[error("Invalid retry.max_attempts: {0}. Cannot be 0")]
    InvalidMaxAttempts(u32),

    #[error(
        "Invalid backoff configuration: initial_backoff_ms ({0}) must be less than max_backoff_ms ({1})"
    )]
    InvalidBackoff(u64, u64),

    #[error("Configuration validation failed: {0}")]
    ValidationFailed(String),
}

/// Configuration loader with hierarchical merging
pub struct ConfigLoader;

impl ConfigLoader {
    /// Load configuration for the current directory.
    ///
    /// Precedence (lowest to highest):
    /// 1. Programmatic defaults (Serialized)
    /// 2. .storyforge/config.yaml
    /// 3. .storyforge/local.yaml (optional overrides)
    /// 4. Environment variables (STORYFORGE_* prefix)
    pub fn load() -> Result<Config> {
        Self::load_from_dir(".")
    }

    /// Same as [`ConfigLoader::load`] with `.storyforge/` under `root`.
    pub fn load_from_dir(root: impl AsRef<Path>) -> Result<Config> {
        let dir = root.as_ref().join(CONFIG_DIR);
        let config: Config = Figment::new()
            .merge(Serialized::defaults(Config::default()))
            .merge(Yaml::file(dir.join("config.yaml")))
            .merge(Yaml::file(dir.join("local.yaml")))
            .merge(Env::prefixed(ENV_PREFIX).split("__"))
            .extract()
            .context("Failed to extract configuration from figment")?;

        Self::validate(&config)?;
        Ok(config)
    }

    /// Load configuration from a specific file, still honoring environment overrides.
    pub fn load_from_file(path: impl AsRef<Path>) -> Result<Config> {
        let path = path.as_ref();
        if !path.exists() {
            anyhow::bail!("Config file not found: {}", path.display());
        }

        let config: Config = Figment::new()
            .merge(Serialized::defaults(Config::default()))
            .merge(Yaml::file(path))
            .merge(Env::prefixed(ENV_PREFIX).split("__"))
            .extract()
            .with_context(|| format!("Failed to load config from {}", path.display()))?;

        Self::validate(&config)?;
        Ok(config)
    }

    /// Validate configuration after loading
    pub fn validate(config: &Config) -> Result<(), ConfigError> {
        if config.chunking.max_lines == 0 {
            return Err(ConfigError::InvalidMaxLines(config.chunking.max_lines));
        }

        for (field, value) in [
            ("retrieval.epic_top_k", config.retrieval.epic_top_k),
            ("retrieval.story_top_k", config.retrieval.story_top_k),
        ] {
            if value == 0 {
                return Err(ConfigError::InvalidTopK { field, value });
            }
        }

        let threshold = config.duplicates.threshold;
        if !(0.0..=1.0).contains(&threshold) {
            return Err(ConfigError::InvalidThreshold(threshold));
        }

        for (field, value) in [
            ("llm.temperature", config.llm.temperature),
            (
                "llm.regeneration_retry_temperature",
                config.llm.regeneration_retry_temperature,
            ),
        ] {
            if !(0.0..=2.0).contains(&value) {
                return Err(ConfigError::InvalidTemperature { field, value });
            }
        }

        if config.llm.base_url.trim().is_empty() {
            return Err(ConfigError::ValidationFailed(
                "llm.base_url cannot be empty".to_string(),
            ));
        }

        if config.embedding.dimension == 0 {
            return Err(ConfigError::ValidationFailed(
                "embedding.dimension must be at least 1".to_string(),
            ));
        }

        if config.embedding.max_batch_size == 0 {
            return Err(ConfigError::ValidationFailed(
                "embedding.max_batch_size must be at least 1".to_string(),
            ));
        }

        let valid_log_levels = ["trace", "debug", "info", "warn", "error"];
        if !valid_log_levels.contains(&config.logging.level.as_str()) {
            return Err(ConfigError::InvalidLogLevel(config.logging.level.clone()));
        }

        let valid_log_formats = ["json", "pretty"];
        if !valid_log_formats.contains(&config.logging.format.as_str()) {
            return Err(ConfigError::InvalidLogFormat(config.logging.format.clone()));
        }

        let valid_rotations = ["daily", "hourly", "never"];
        if !valid_rotations.contains(&config.logging.rotation.as_str()) {
            return Err(ConfigError::InvalidRotation(config.logging.rotation.clone()));
        }

        if config.retry.max_attempts == 0 {
            return Err(ConfigError::InvalidMaxAttempts(config.retry.max_attempts));
        }

        if config.retry.initial_backoff_ms >= config.retry.max_backoff_ms {
            return Err(ConfigError::InvalidBackoff(
                config.retry.initial_backoff_ms,
                config.retry.max_backoff_ms,
            ));
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::models::config::EmbeddingProviderKind;

    #[test]
    fn test_default_config_is_valid() {
        let config = Config::default();
        assert_eq!(config.chunking.max_lines, 5);
        assert_eq!(config.retrieval.epic_top_k, 5);
        assert_eq!(config.retrieval.story_top_k, 4);
        assert!((config.duplicates.threshold - 0.75).abs() < f64::EPSILON);
        assert_eq!(config.tracker.lookback_days, 90);
        ConfigLoader::validate(&config).expect("Default config should be valid");
    }

    #[test]
    fn test_yaml_parsing() {
        let yaml = r"
llm:
  model: llama-3.3-70b-versatile
  temperature: 0.4
embedding:
  provider: openai
  dimension: 1536
chunking:
  max_lines: 8
  heading_keywords: [epic, capability]
duplicates:
  threshold: 0.9
logging:
  level: debug
  format: json
";

        let config: Config = serde_yaml::from_str(yaml).expect("YAML should parse");

        assert_eq!(config.llm.model, "llama-3.3-70b-versatile");
        assert_eq!(config.llm.epic_max_tokens, 650);
        assert_eq!(config.embedding.provider, EmbeddingProviderKind::Openai);
        assert_eq!(config.embedding.dimension, 1536);
        assert_eq!(config.chunking.max_lines, 8);
        assert_eq!(config.chunking.heading_keywords, vec!["epic", "capability"]);
        assert_eq!(config.logging.format, "json");
        assert_eq!(config.retrieval.story_top_k, 4);

        ConfigLoader::validate(&config).expect("Parsed config should be valid");
    }

    #[test]
    fn test_validate_rejects_zero_max_lines() {
        let mut config = Config::default();
        config.chunking.max_lines = 0;
        assert_eq!(
            ConfigLoader::validate(&config),
            Err(ConfigError::InvalidMaxLines(0))
        );
    }

    #[test]
    fn test_validate_rejects_threshold_out_of_range() {
        let mut config = Config::default();
        config.duplicates.threshold = 1.5;
        assert!(matches!(
            ConfigLoader::validate(&config),
            Err(ConfigError::InvalidThreshold(_))
        ));
    }

    #[test]
    fn test_validate_rejects_zero_top_k() {
        let mut config = Config::default();
        config.retrieval.story_top_k = 0;
        assert_eq!(
            ConfigLoader::validate(&config),
            Err(ConfigError::InvalidTopK {
                field: "retrieval.story_top_k",
                value: 0
            })
        );
    }

    #[test]
    fn test_validate_rejects_bad_logging() {
        let mut config = Config::default();
        config.logging.level = "verbose".to_string();
        assert!(matches!(
            ConfigLoader::validate(&config),
            Err(ConfigError::InvalidLogLevel(_))
        ));

        let mut config = Config::default();
        config.logging.rotation = "weekly".to_string();
        assert!(matches!(
            ConfigLoader::validate(&config),
            Err(ConfigError::InvalidRotation(_))
        ));
    }

    #[test]
    fn test_validate_rejects_inverted_backoff() {
        let mut config = Config::default();
        config.retry.initial_backoff_ms = 5000;
        config.retry.max_backoff_ms = 1000;
        assert_eq!(
            ConfigLoader::validate(&config),
            Err(ConfigError::InvalidBackoff(5000, 1000))
        );
    }
}
