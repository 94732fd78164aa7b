use anyhow::{Context, Result};
use serde::Serialize;
use std::path::Path;

use super::{build_app, read_chunks};
use crate::cli::output::progress::create_spinner;
use crate::cli::output::table::format_epics_table;
use crate::cli::output::{output, CommandOutput};
use crate::domain::models::{Config, Epic};

#[derive(Debug, Serialize)]
pub struct EpicsOutput {
    pub epics: Vec<Epic>,
}

impl CommandOutput for EpicsOutput {
    fn to_human(&self) -> String {
        if self.epics.is_empty() {
            return "No epics generated.".to_string();
        }
        format!(
            "{}\n\n{} epic{}",
            format_epics_table(&self.epics),
            self.epics.len(),
            if self.epics.len() == 1 { "" } else { "s" }
        )
    }
}

/// Handle the epics command
pub async fn execute(
    config: Config,
    file: &Path,
    query: Option<String>,
    top_k: Option<usize>,
    json: bool,
) -> Result<()> {
    let app = build_app(config)?;
    let (_, chunks) = read_chunks(file, &app.chunker)?;

    let spinner = create_spinner(format!("Generating epics from {} chunks", chunks.len()), json);
    let result = app
        .epics
        .generate_epics_from_requirements(&chunks, query.as_deref(), top_k)
        .await;
    spinner.finish_and_clear();

    let epics = result.context("Epic generation failed")?;
    output(&EpicsOutput { epics }, json);
    Ok(())
}
