//! Table output formatting for CLI commands using comfy-table.

use comfy_table::{presets, Attribute, Cell, ContentArrangement, Table};

use super::truncate;
use crate::domain::models::{Chunk, DuplicateMatch, Epic, GeneratedFiles, Story};

fn header(names: &[&str]) -> Vec<Cell> {
    names
        .iter()
        .map(|name| Cell::new(name).add_attribute(Attribute::Bold))
        .collect()
}

fn base_table() -> Table {
    let mut table = Table::new();
    table
        .load_preset(presets::UTF8_FULL)
        .set_content_arrangement(ContentArrangement::Dynamic);
    table
}

pub fn format_chunks_table(chunks: &[Chunk]) -> String {
    let mut table = base_table();
    table.set_header(header(&["Chunk", "Lines", "Text"]));
    for chunk in chunks {
        table.add_row(vec![
            Cell::new(&chunk.chunk_id),
            Cell::new(chunk.line_count()),
            Cell::new(truncate(&chunk.text.replace('\n', " / "), 80)),
        ]);
    }
    table.to_string()
}

pub fn format_epics_table(epics: &[Epic]) -> String {
    let mut table = base_table();
    table.set_header(header(&["Epic", "Description", "Requirements", "Chunks"]));
    for epic in epics {
        table.add_row(vec![
            Cell::new(&epic.epic_name),
            Cell::new(truncate(&epic.description, 60)),
            Cell::new(epic.covered_requirements.len()),
            Cell::new(epic.source_chunk_ids.join(", ")),
        ]);
    }
    table.to_string()
}

pub fn format_stories_table(stories: &[Story]) -> String {
    let mut table = base_table();
    table.set_header(header(&["Summary", "Acceptance criteria", "Done", "Chunk"]));
    for story in stories {
        table.add_row(vec![
            Cell::new(truncate(&story.summary, 50)),
            Cell::new(story.acceptance_criteria.len()),
            Cell::new(story.definition_of_done.len()),
            Cell::new(&story.source_chunk_id),
        ]);
    }
    table.to_string()
}

pub fn format_duplicates_table(matches: &[DuplicateMatch]) -> String {
    let mut table = base_table();
    table.set_header(header(&["Issue", "Similarity"]));
    for duplicate in matches {
        table.add_row(vec![
            Cell::new(&duplicate.jira_key),
            Cell::new(format!("{:.2}", duplicate.similarity)),
        ]);
    }
    table.to_string()
}

pub fn format_files_table(files: &GeneratedFiles) -> String {
    let mut table = base_table();
    table.set_header(header(&["Path", "Lines"]));
    for (path, contents) in files {
        table.add_row(vec![Cell::new(path), Cell::new(contents.lines().count())]);
    }
    table.to_string()
}
