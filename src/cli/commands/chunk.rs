use anyhow::{Context, Result};
use serde::Serialize;
use std::path::Path;

use super::read_chunks;
use crate::cli::output::table::format_chunks_table;
use crate::cli::output::{output, CommandOutput};
use crate::domain::models::{Chunk, Config};
use crate::services::Chunker;

#[derive(Debug, Serialize)]
pub struct ChunksOutput {
    pub file: String,
    pub chunks: Vec<Chunk>,
}

impl CommandOutput for ChunksOutput {
    fn to_human(&self) -> String {
        if self.chunks.is_empty() {
            return format!("No requirement lines found in {}.", self.file);
        }
        format!(
            "{}\n\n{} chunk{} from {}",
            format_chunks_table(&self.chunks),
            self.chunks.len(),
            if self.chunks.len() == 1 { "" } else { "s" },
            self.file
        )
    }
}

/// Handle the chunk command. No model or network calls.
pub fn execute(config: &Config, file: &Path, json: bool) -> Result<()> {
    let chunker = Chunker::with_config(&config.chunking).context("Invalid chunking configuration")?;
    let (_, chunks) = read_chunks(file, &chunker)?;

    output(
        &ChunksOutput {
            file: file.display().to_string(),
            chunks,
        },
        json,
    );
    Ok(())
}
