//! Storyforge - grounded Epics and Stories from requirements documents
//!
//! A requirements document is split into small chunks, the chunks most
//! relevant to a query are selected by embedding similarity, and a language
//! model turns each selected chunk into candidate epics or stories. The
//! candidates are then merged into one deduplicated set that keeps every
//! requirement and chunk it was grounded on.
//!
//! # Architecture
//!
//! - **Domain Layer** (`domain`): models, errors and the ports to external systems
//! - **Service Layer** (`services`): chunking, retrieval, generation and merging
//! - **Adapters** (`adapters`): LLM, embedding, Jira and HTTP implementations
//! - **Application Layer** (`application`): wiring of services from configuration
//! - **Infrastructure Layer** (`infrastructure`): configuration, logging, document loading
//! - **CLI Layer** (`cli`): command-line interface
//!
//! # Example
//!
//! ```ignore
//! use storyforge::application::Storyforge;
//! use storyforge::infrastructure::config::ConfigLoader;
//!
//! #[tokio::main]
//! async fn main() -> anyhow::Result<()> {
//!     let app = Storyforge::from_config(ConfigLoader::load()?)?;
//!     let chunks = app.chunker.chunk("Billing:\nSend invoices monthly");
//!     let epics = app.epics.generate_epics_from_requirements(&chunks, None, None).await?;
//!     println!("{}", serde_json::to_string_pretty(&epics)?);
//!     Ok(())
//! }
//! ```

pub mod adapters;
pub mod application;
pub mod cli;
pub mod domain;
pub mod infrastructure;
pub mod services;

// Re-export commonly used types for convenience
pub use application::Storyforge;
pub use domain::models::{Chunk, Config, Epic, Story};
pub use domain::{DomainError, DomainResult};
pub use infrastructure::config::{ConfigError, ConfigLoader};
pub use services::{GenerationError, PipelineError};
