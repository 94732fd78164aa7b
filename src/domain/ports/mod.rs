//! Port trait definitions (Hexagonal Architecture)
//!
//! This module defines async trait interfaces that adapters implement:
//! - LlmBackend: text generation
//! - EmbeddingProvider: text to vector
//! - IssueTracker: existing issues, issue creation and tracker settings
//!
//! These traits keep the pipeline independent of any vendor.

pub mod embedding;
pub mod llm;
pub mod tracker;

pub use embedding::{EmbeddingInput, EmbeddingOutput, EmbeddingProvider};
pub use llm::{CompletionRequest, LlmBackend, LlmError};
pub use tracker::{IssueTracker, TrackerConfigUpdate, TrackerConfigView, TrackerError};
