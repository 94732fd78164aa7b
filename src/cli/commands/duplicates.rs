use anyhow::{Context, Result};
use serde::Serialize;

use super::build_app;
use crate::cli::output::table::format_duplicates_table;
use crate::cli::output::{output, CommandOutput};
use crate::domain::models::{Config, DuplicateMatch, Story};

#[derive(Debug, Serialize)]
pub struct DuplicatesOutput {
    pub summary: String,
    pub duplicates: Vec<DuplicateMatch>,
}

impl CommandOutput for DuplicatesOutput {
    fn to_human(&self) -> String {
        if self.duplicates.is_empty() {
            return format!("No likely duplicates for \"{}\".", self.summary);
        }
        format!(
            "Likely duplicates for \"{}\":\n{}",
            self.summary,
            format_duplicates_table(&self.duplicates)
        )
    }
}

/// Handle the duplicates command
pub async fn execute(
    config: Config,
    summary: String,
    threshold: Option<f64>,
    json: bool,
) -> Result<()> {
    if let Some(threshold) = threshold {
        if !(0.0..=1.0).contains(&threshold) {
            anyhow::bail!("Threshold must be between 0 and 1, got {threshold}");
        }
    }

    let app = build_app(config)?;
    let story = Story::new("", summary.trim());
    let duplicates = app
        .duplicates
        .check_story(&story, threshold)
        .await
        .context("Duplicate check failed")?;

    output(
        &DuplicatesOutput {
            summary: story.summary,
            duplicates,
        },
        json,
    );
    Ok(())
}
