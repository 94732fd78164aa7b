//! Infrastructure adapters for external systems.

pub mod embeddings;
pub mod http;
pub mod jira;
pub mod llm;
