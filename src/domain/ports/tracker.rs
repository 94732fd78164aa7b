//! Issue tracker port.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::domain::models::{ExistingIssue, Story, TrackerHealth};

/// Errors raised by issue tracker adapters.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum TrackerError {
    /// Required settings are absent; raised before any network call.
    #[error("Tracker is not configured: missing {}", .0.join(", "))]
    MissingConfig(Vec<&'static str>),

    #[error("Tracker request failed: {0}")]
    Request(String),

    #[error("Tracker returned {status}: {body}")]
    Status { status: u16, body: String },

    #[error("Failed to parse tracker response: {0}")]
    Parse(String),

    /// A batch create stopped partway. `created` lists the keys that exist.
    #[error("Created {} of {requested} issues before failing: {source}", .created.len())]
    PartialCreate {
        created: Vec<String>,
        requested: usize,
        source: Box<TrackerError>,
    },
}

/// Tracker settings as shown to callers. The API token is never included.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TrackerConfigView {
    pub url: Option<String>,
    pub email: Option<String>,
    pub project_key: Option<String>,
    /// Url, email, token and project key are all present.
    pub configured: bool,
    pub token_configured: bool,
}

/// Runtime overrides; `None` keeps the current value.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TrackerConfigUpdate {
    #[serde(default)]
    pub url: Option<String>,
    #[serde(default)]
    pub email: Option<String>,
    #[serde(default)]
    pub api_token: Option<String>,
    #[serde(default)]
    pub project_key: Option<String>,
}

/// An issue tracker that stories are exported to.
#[async_trait]
pub trait IssueTracker: Send + Sync {
    /// Issues of the given types created in the last `days` days, newest first.
    async fn recent_issues(
        &self,
        issue_types: &[&str],
        days: u32,
        limit: u32,
    ) -> Result<Vec<ExistingIssue>, TrackerError>;

    /// Create one issue per story and return the new issue keys in order.
    /// A failure after the first issue is reported as
    /// [`TrackerError::PartialCreate`] carrying the keys already created.
    async fn create_stories(&self, stories: &[Story]) -> Result<Vec<String>, TrackerError>;

    /// Connectivity and credential check. Failures are reported, not raised.
    async fn health(&self) -> TrackerHealth;

    async fn config_view(&self) -> TrackerConfigView;

    /// Merge runtime overrides over the current settings.
    async fn configure(&self, update: TrackerConfigUpdate) -> TrackerConfigView;
}
