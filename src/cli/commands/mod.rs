//! Command handlers. Each takes parsed arguments and the JSON flag.

pub mod chunk;
pub mod codegen;
pub mod duplicates;
pub mod epics;
pub mod serve;
pub mod stories;
pub mod tracker;

use anyhow::{Context, Result};
use std::path::Path;

use crate::application::Storyforge;
use crate::domain::models::{Chunk, Config};
use crate::infrastructure::ingestion::load_requirements;
use crate::services::Chunker;

/// Build every service from `config`.
pub fn build_app(config: Config) -> Result<Storyforge> {
    Storyforge::from_config(config).context("Failed to initialize storyforge services")
}

/// Load and chunk a requirements document.
pub fn read_chunks(path: &Path, chunker: &Chunker) -> Result<(String, Vec<Chunk>)> {
    let text = load_requirements(path)
        .with_context(|| format!("Failed to load requirements from {}", path.display()))?;
    let chunks = chunker.chunk(&text);
    Ok((text, chunks))
}
