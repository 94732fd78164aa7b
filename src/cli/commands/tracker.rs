use anyhow::{Context, Result};
use serde::Serialize;

use crate::adapters::jira::JiraClient;
use crate::cli::output::{output, CommandOutput};
use crate::cli::types::TrackerCommands;
use crate::domain::models::{Config, TrackerHealth};
use crate::domain::ports::{IssueTracker, TrackerConfigView};

#[derive(Debug, Serialize)]
#[serde(transparent)]
pub struct TrackerConfigOutput(pub TrackerConfigView);

impl CommandOutput for TrackerConfigOutput {
    fn to_human(&self) -> String {
        let view = &self.0;
        let show = |value: &Option<String>| value.clone().unwrap_or_else(|| "-".to_string());
        format!(
            "Tracker configuration:\n  URL:         {}\n  Email:       {}\n  Project key: {}\n  Token:       {}\n  Configured:  {}",
            show(&view.url),
            show(&view.email),
            show(&view.project_key),
            if view.token_configured { "set" } else { "missing" },
            if view.configured { "yes" } else { "no" }
        )
    }
}

#[derive(Debug, Serialize)]
#[serde(transparent)]
pub struct TrackerHealthOutput(pub TrackerHealth);

impl CommandOutput for TrackerHealthOutput {
    fn to_human(&self) -> String {
        match (&self.0.user, &self.0.error) {
            (Some(user), _) if self.0.ok => format!("Tracker reachable, authenticated as {user}"),
            (_, Some(error)) => format!("Tracker check failed: {error}"),
            _ => "Tracker check failed".to_string(),
        }
    }
}

/// Handle tracker subcommands. Health failures are reported, not raised.
pub async fn execute(config: &Config, command: TrackerCommands, json: bool) -> Result<()> {
    let client = JiraClient::new(&config.tracker).context("Failed to create tracker client")?;

    match command {
        TrackerCommands::Config => {
            output(&TrackerConfigOutput(client.config_view().await), json);
        }
        TrackerCommands::Health => {
            output(&TrackerHealthOutput(client.health().await), json);
        }
    }
    Ok(())
}
