use anyhow::{Context, Result};
use serde::Serialize;
use std::path::Path;

use super::{build_app, read_chunks};
use crate::cli::output::progress::create_spinner;
use crate::cli::output::table::format_stories_table;
use crate::cli::output::{output, CommandOutput};
use crate::domain::models::{Config, Epic, Story};

#[derive(Debug, Serialize)]
pub struct StoriesOutput {
    pub epic: String,
    pub stories: Vec<Story>,
}

impl CommandOutput for StoriesOutput {
    fn to_human(&self) -> String {
        if self.stories.is_empty() {
            return format!("No stories generated for {}.", self.epic);
        }
        format!(
            "Epic: {}\n{}\n\n{} stor{}",
            self.epic,
            format_stories_table(&self.stories),
            self.stories.len(),
            if self.stories.len() == 1 { "y" } else { "ies" }
        )
    }
}

/// Handle the stories command
pub async fn execute(
    config: Config,
    file: &Path,
    epic_name: String,
    description: String,
    top_k: Option<usize>,
    json: bool,
) -> Result<()> {
    if epic_name.trim().is_empty() {
        anyhow::bail!("Epic name cannot be empty");
    }

    let app = build_app(config)?;
    let (_, chunks) = read_chunks(file, &app.chunker)?;
    let epic = Epic::new(epic_name.trim(), description);

    let spinner = create_spinner(format!("Generating stories for {}", epic.epic_name), json);
    let result = app
        .stories
        .generate_stories_for_epic(&epic, &chunks, top_k)
        .await;
    spinner.finish_and_clear();

    let stories = result.context("Story generation failed")?;
    output(
        &StoriesOutput {
            epic: epic.epic_name,
            stories,
        },
        json,
    );
    Ok(())
}
