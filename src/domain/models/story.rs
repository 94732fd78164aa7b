use serde::{Deserialize, Serialize};

use super::text::normalize_key;

/// A concrete, testable unit of work under one epic.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Story {
    pub epic_name: String,
    pub summary: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub acceptance_criteria: Vec<String>,
    #[serde(default)]
    pub definition_of_done: Vec<String>,
    #[serde(default)]
    pub source_chunk_id: String,
}

impl Story {
    pub fn new(epic_name: impl Into<String>, summary: impl Into<String>) -> Self {
        Self {
            epic_name: epic_name.into(),
            summary: summary.into(),
            ..Default::default()
        }
    }

    pub fn key(&self) -> StoryKey {
        StoryKey::new(&self.epic_name, &self.summary)
    }
}

/// Identity of a story: owning epic plus summary, both normalized.
///
/// Two stories with the same summary under different epics stay distinct.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct StoryKey {
    epic: String,
    summary: String,
}

impl StoryKey {
    pub fn new(epic_name: &str, summary: &str) -> Self {
        Self {
            epic: normalize_key(epic_name),
            summary: normalize_key(summary),
        }
    }

    pub fn epic(&self) -> &str {
        &self.epic
    }

    pub fn summary(&self) -> &str {
        &self.summary
    }
}
