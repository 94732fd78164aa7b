//! Line-oriented requirements chunking.
//!
//! Requirements documents are mostly short lines and headings. Lines are
//! grouped into small chunks, and headings always open a fresh chunk so a
//! chunk never straddles two feature areas.

use crate::domain::errors::{DomainError, DomainResult};
use crate::domain::models::text::collapse_whitespace;
use crate::domain::models::{Chunk, ChunkingConfig};

/// Splits requirements text into content-addressed chunks.
#[derive(Debug, Clone)]
pub struct Chunker {
    max_lines: usize,
    heading_keywords: Vec<String>,
}

impl Chunker {
    /// Create a chunker with the default configuration.
    pub fn new() -> Self {
        Self {
            max_lines: ChunkingConfig::default().max_lines,
            heading_keywords: ChunkingConfig::default().heading_keywords,
        }
    }

    /// Create a chunker with custom configuration.
    pub fn with_config(config: &ChunkingConfig) -> DomainResult<Self> {
        if config.max_lines == 0 {
            return Err(DomainError::ValidationFailed(
                "chunking.max_lines must be at least 1".to_string(),
            ));
        }

        Ok(Self {
            max_lines: config.max_lines,
            heading_keywords: config
                .heading_keywords
                .iter()
                .map(|k| k.trim().to_lowercase())
                .filter(|k| !k.is_empty())
                .collect(),
        })
    }

    /// Split `text` into chunks.
    ///
    /// Every non-blank line lands in exactly one chunk, in input order.
    pub fn chunk(&self, text: &str) -> Vec<Chunk> {
        let mut chunks = Vec::new();
        let mut current: Vec<String> = Vec::with_capacity(self.max_lines);

        for raw in text.lines() {
            let line = collapse_whitespace(raw);
            if line.is_empty() {
                continue;
            }

            if self.is_semantic_break(&line) && !current.is_empty() {
                chunks.push(Chunk::from_text(current.join("\n")));
                current.clear();
            }

            current.push(line);

            if current.len() >= self.max_lines {
                chunks.push(Chunk::from_text(current.join("\n")));
                current.clear();
            }
        }

        if !current.is_empty() {
            chunks.push(Chunk::from_text(current.join("\n")));
        }

        chunks
    }

    /// A heading line: it ends with `:` or starts with a heading keyword.
    fn is_semantic_break(&self, line: &str) -> bool {
        if line.ends_with(':') {
            return true;
        }

        let Some(first_word) = line.split_whitespace().next() else {
            return false;
        };

        let letters: String = first_word
            .chars()
            .take_while(|c| c.is_alphabetic())
            .collect();
        let rest = &first_word[letters.len()..];

        // "Epic:" and "Feature-" count, "Epics" and "Module2" do not
        if rest.chars().next().is_some_and(char::is_alphanumeric) {
            return false;
        }

        let letters = letters.to_lowercase();
        self.heading_keywords.iter().any(|k| *k == letters)
    }
}

impl Default for Chunker {
    fn default() -> Self {
        Self::new()
    }
}
