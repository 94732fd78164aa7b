use anyhow::{Context, Result};
use serde::Serialize;
use std::path::{Path, PathBuf};

use super::build_app;
use crate::cli::output::progress::create_spinner;
use crate::cli::output::table::format_files_table;
use crate::cli::output::{output, CommandOutput};
use crate::domain::models::{Config, GeneratedFiles, Story};

#[derive(Debug, Serialize)]
pub struct FilesOutput {
    pub stack: String,
    pub files: GeneratedFiles,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub written_to: Option<String>,
}

impl CommandOutput for FilesOutput {
    fn to_human(&self) -> String {
        let mut out = format!("{} files for {}\n{}", self.files.len(), self.stack, format_files_table(&self.files));
        if let Some(dir) = &self.written_to {
            out.push_str(&format!("\nWritten to {dir}"));
        }
        out
    }
}

/// Handle the codegen command
pub async fn execute(
    config: Config,
    story_path: &Path,
    stack: String,
    out_dir: Option<PathBuf>,
    json: bool,
) -> Result<()> {
    let raw = std::fs::read_to_string(story_path)
        .with_context(|| format!("Failed to read story from {}", story_path.display()))?;
    let story: Story = serde_json::from_str(&raw)
        .with_context(|| format!("Invalid story JSON in {}", story_path.display()))?;

    let app = build_app(config)?;
    let spinner = create_spinner(format!("Generating {stack} code for \"{}\"", story.summary), json);
    let result = app
        .code_generator
        .generate_code_for_story(&story, &stack)
        .await;
    spinner.finish_and_clear();
    let files = result.context("Code generation failed")?;

    let written_to = match out_dir {
        Some(dir) => {
            write_files(&dir, &files)?;
            Some(dir.display().to_string())
        }
        None => None,
    };

    output(
        &FilesOutput {
            stack,
            files,
            written_to,
        },
        json,
    );
    Ok(())
}

/// Write generated files under `dir`. Paths are already sanitized relative paths.
pub fn write_files(dir: &Path, files: &GeneratedFiles) -> Result<()> {
    for (relative, contents) in files {
        let target = dir.join(relative);
        if let Some(parent) = target.parent() {
            std::fs::create_dir_all(parent)
                .with_context(|| format!("Failed to create {}", parent.display()))?;
        }
        std::fs::write(&target, contents)
            .with_context(|| format!("Failed to write {}", target.display()))?;
    }
    Ok(())
}
