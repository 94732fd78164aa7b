use serde::{Deserialize, Serialize};

use super::text::normalize_key;

/// Scope boundaries of an epic.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct EpicScope {
    #[serde(default)]
    pub in_scope: Vec<String>,
    #[serde(default)]
    pub out_of_scope: Vec<String>,
}

impl EpicScope {
    pub fn is_empty(&self) -> bool {
        self.in_scope.is_empty() && self.out_of_scope.is_empty()
    }
}

/// A business-level grouping of stories.
///
/// Candidates come out of the MAP step one per model answer; merged epics
/// come out of the reducer, one per [`EpicKey`].
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Epic {
    pub epic_name: String,
    pub description: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub summary: Option<String>,
    #[serde(default)]
    pub business_objectives: Vec<String>,
    #[serde(default, skip_serializing_if = "EpicScope::is_empty")]
    pub scope: EpicScope,
    #[serde(default)]
    pub acceptance_criteria: Vec<String>,
    #[serde(default)]
    pub definition_of_done: Vec<String>,
    #[serde(default)]
    pub covered_requirements: Vec<String>,
    #[serde(default)]
    pub source_chunk_ids: Vec<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub assumptions: Option<String>,
}

impl Epic {
    /// Create an epic with only the required fields set.
    pub fn new(epic_name: impl Into<String>, description: impl Into<String>) -> Self {
        Self {
            epic_name: epic_name.into(),
            description: description.into(),
            ..Default::default()
        }
    }

    pub fn key(&self) -> EpicKey {
        EpicKey::new(&self.epic_name)
    }
}

/// Identity of an epic: its name, case- and whitespace-insensitive.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct EpicKey(String);

impl EpicKey {
    pub fn new(epic_name: &str) -> Self {
        Self(normalize_key(epic_name))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}
