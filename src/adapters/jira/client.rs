//! Jira REST API v2 client.
//!
//! Settings resolve in order: runtime overrides from [`IssueTracker::configure`],
//! then the `tracker` config section, then the `JIRA_URL`, `JIRA_EMAIL`,
//! `JIRA_API_TOKEN` and `JIRA_PROJECT_KEY` environment variables.

use async_trait::async_trait;
use reqwest::Client;
use std::time::Duration;
use tokio::sync::RwLock;
use tracing::{debug, info, warn};

use super::models::{
    JiraCreateFields, JiraCreateIssueRequest, JiraCreateIssueResponse, JiraIssueTypeRef,
    JiraMyself, JiraProjectRef, JiraSearchResponse,
};
use crate::domain::errors::{DomainError, DomainResult};
use crate::domain::models::{ExistingIssue, Story, TrackerConfig, TrackerHealth};
use crate::domain::ports::{IssueTracker, TrackerConfigUpdate, TrackerConfigView, TrackerError};

/// Issue type used for exported stories.
const STORY_ISSUE_TYPE: &str = "Story";

/// Resolved connection settings.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct JiraSettings {
    pub url: Option<String>,
    pub email: Option<String>,
    pub api_token: Option<String>,
    pub project_key: Option<String>,
}

impl JiraSettings {
    /// Config values with environment fallbacks.
    pub fn resolve(config: &TrackerConfig) -> Self {
        Self {
            url: non_empty(config.url.clone()).or_else(|| env_var("JIRA_URL")),
            email: non_empty(config.email.clone()).or_else(|| env_var("JIRA_EMAIL")),
            api_token: non_empty(config.api_token.clone()).or_else(|| env_var("JIRA_API_TOKEN")),
            project_key: non_empty(config.project_key.clone())
                .or_else(|| env_var("JIRA_PROJECT_KEY")),
        }
    }

    fn merge(&mut self, update: TrackerConfigUpdate) {
        if let Some(url) = non_empty(update.url) {
            self.url = Some(url);
        }
        if let Some(email) = non_empty(update.email) {
            self.email = Some(email);
        }
        if let Some(token) = non_empty(update.api_token) {
            self.api_token = Some(token);
        }
        if let Some(key) = non_empty(update.project_key) {
            self.project_key = Some(key);
        }
    }

    pub fn view(&self) -> TrackerConfigView {
        TrackerConfigView {
            url: self.url.clone(),
            email: self.email.clone(),
            project_key: self.project_key.clone(),
            configured: self.url.is_some()
                && self.email.is_some()
                && self.api_token.is_some()
                && self.project_key.is_some(),
            token_configured: self.api_token.is_some(),
        }
    }

    fn credentials(&self, need_project: bool) -> Result<Credentials, TrackerError> {
        let mut missing = Vec::new();
        if self.url.is_none() {
            missing.push("url");
        }
        if self.email.is_none() {
            missing.push("email");
        }
        if self.api_token.is_none() {
            missing.push("api_token");
        }
        if need_project && self.project_key.is_none() {
            missing.push("project_key");
        }

        match (&self.url, &self.email, &self.api_token) {
            (Some(url), Some(email), Some(token)) if missing.is_empty() => Ok(Credentials {
                base_url: url.trim_end_matches('/').to_string(),
                email: email.clone(),
                api_token: token.clone(),
                project_key: self.project_key.clone().unwrap_or_default(),
            }),
            _ => Err(TrackerError::MissingConfig(missing)),
        }
    }
}

struct Credentials {
    base_url: String,
    email: String,
    api_token: String,
    project_key: String,
}

fn non_empty(value: Option<String>) -> Option<String> {
    value
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}

fn env_var(name: &str) -> Option<String> {
    non_empty(std::env::var(name).ok())
}

/// JQL for recent issues of `issue_types` in `project_key`, newest first.
pub fn recent_issues_jql(project_key: &str, issue_types: &[&str], days: u32) -> String {
    format!(
        "project = {project_key} AND issuetype IN ({}) AND created >= -{days}d ORDER BY created DESC",
        issue_types.join(", ")
    )
}

/// Issue description: story text followed by its checklists.
pub fn story_description(story: &Story) -> String {
    let mut description = story.description.clone();
    for (title, items) in [
        ("Acceptance Criteria", &story.acceptance_criteria),
        ("Definition of Done", &story.definition_of_done),
    ] {
        if items.is_empty() {
            continue;
        }
        if !description.is_empty() {
            description.push_str("\n\n");
        }
        description.push_str(title);
        description.push(':');
        for item in items {
            description.push_str("\n- ");
            description.push_str(item);
        }
    }
    description
}

/// [`IssueTracker`] over Jira Cloud or Server with basic auth.
pub struct JiraClient {
    http: Client,
    settings: RwLock<JiraSettings>,
}

impl JiraClient {
    pub fn new(config: &TrackerConfig) -> DomainResult<Self> {
        Self::with_settings(JiraSettings::resolve(config), config.timeout_secs)
    }

    pub fn with_settings(settings: JiraSettings, timeout_secs: u64) -> DomainResult<Self> {
        let http = Client::builder()
            .timeout(Duration::from_secs(timeout_secs.max(1)))
            .build()
            .map_err(|e| DomainError::ValidationFailed(format!("Failed to create HTTP client: {e}")))?;
        Ok(Self {
            http,
            settings: RwLock::new(settings),
        })
    }

    async fn credentials(&self, need_project: bool) -> Result<Credentials, TrackerError> {
        self.settings.read().await.credentials(need_project)
    }

    async fn send_json<T: serde::de::DeserializeOwned>(
        request: reqwest::RequestBuilder,
        operation: &str,
    ) -> Result<T, TrackerError> {
        let response = request
            .header("Accept", "application/json")
            .send()
            .await
            .map_err(|e| TrackerError::Request(format!("Jira {operation} request failed: {e}")))?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(TrackerError::Status {
                status: status.as_u16(),
                body,
            });
        }

        response
            .json::<T>()
            .await
            .map_err(|e| TrackerError::Parse(format!("Jira {operation} response: {e}")))
    }
}

#[async_trait]
impl IssueTracker for JiraClient {
    async fn recent_issues(
        &self,
        issue_types: &[&str],
        days: u32,
        limit: u32,
    ) -> Result<Vec<ExistingIssue>, TrackerError> {
        let creds = self.credentials(true).await?;
        let jql = recent_issues_jql(&creds.project_key, issue_types, days);
        debug!(%jql, limit, "searching Jira issues");

        let request = self
            .http
            .get(format!("{}/rest/api/2/search", creds.base_url))
            .basic_auth(&creds.email, Some(&creds.api_token))
            .query(&[
                ("jql", jql.as_str()),
                ("maxResults", limit.to_string().as_str()),
                ("fields", "summary"),
            ]);

        let response: JiraSearchResponse = Self::send_json(request, "search").await?;
        Ok(response
            .issues
            .into_iter()
            .map(|issue| ExistingIssue::new(issue.key, issue.fields.summary))
            .collect())
    }

    async fn create_stories(&self, stories: &[Story]) -> Result<Vec<String>, TrackerError> {
        let creds = self.credentials(true).await?;
        let url = format!("{}/rest/api/2/issue", creds.base_url);

        let mut keys = Vec::with_capacity(stories.len());
        for story in stories {
            let body = JiraCreateIssueRequest {
                fields: JiraCreateFields {
                    project: JiraProjectRef {
                        key: creds.project_key.clone(),
                    },
                    summary: story.summary.clone(),
                    description: story_description(story),
                    issuetype: JiraIssueTypeRef {
                        name: STORY_ISSUE_TYPE.to_string(),
                    },
                },
            };

            let request = self
                .http
                .post(&url)
                .basic_auth(&creds.email, Some(&creds.api_token))
                .json(&body);

            match Self::send_json::<JiraCreateIssueResponse>(request, "create issue").await {
                Ok(created) => {
                    info!(key = %created.key, summary = %story.summary, "created Jira story");
                    keys.push(created.key);
                }
                Err(err) if keys.is_empty() => return Err(err),
                Err(err) => {
                    warn!(
                        created = keys.len(),
                        requested = stories.len(),
                        error = %err,
                        "Jira batch create stopped partway"
                    );
                    return Err(TrackerError::PartialCreate {
                        created: keys,
                        requested: stories.len(),
                        source: Box::new(err),
                    });
                }
            }
        }
        Ok(keys)
    }

    async fn health(&self) -> TrackerHealth {
        let creds = match self.credentials(false).await {
            Ok(creds) => creds,
            Err(err) => return TrackerHealth::unhealthy(err.to_string()),
        };

        let request = self
            .http
            .get(format!("{}/rest/api/2/myself", creds.base_url))
            .basic_auth(&creds.email, Some(&creds.api_token));

        match Self::send_json::<JiraMyself>(request, "myself").await {
            Ok(me) => TrackerHealth::healthy(me.label()),
            Err(err) => {
                warn!(error = %err, "Jira health check failed");
                TrackerHealth::unhealthy(err.to_string())
            }
        }
    }

    async fn config_view(&self) -> TrackerConfigView {
        self.settings.read().await.view()
    }

    async fn configure(&self, update: TrackerConfigUpdate) -> TrackerConfigView {
        let mut settings = self.settings.write().await;
        settings.merge(update);
        settings.view()
    }
}
