use serde::{Deserialize, Serialize};

/// An issue that already exists in the tracker.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExistingIssue {
    pub key: String,
    pub summary: String,
}

impl ExistingIssue {
    pub fn new(key: impl Into<String>, summary: impl Into<String>) -> Self {
        Self {
            key: key.into(),
            summary: summary.into(),
        }
    }
}

/// Advisory similarity between a generated story and an existing issue.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DuplicateMatch {
    pub jira_key: String,
    /// Similarity in `[0, 1]`, rounded to two decimals.
    pub similarity: f64,
}

/// Result of a tracker connectivity check.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TrackerHealth {
    pub ok: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub user: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl TrackerHealth {
    pub fn healthy(user: impl Into<String>) -> Self {
        Self {
            ok: true,
            user: Some(user.into()),
            error: None,
        }
    }

    pub fn unhealthy(error: impl Into<String>) -> Self {
        Self {
            ok: false,
            user: None,
            error: Some(error.into()),
        }
    }
}
