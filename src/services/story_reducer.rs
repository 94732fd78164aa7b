//! Merge of candidate stories by (epic, summary) identity.

use std::collections::HashMap;

use crate::domain::models::text::extend_unique;
use crate::domain::models::{Story, StoryKey};
use crate::services::epic_reducer::keep_longer;

/// Collapse candidates sharing a [`StoryKey`] into one story each.
///
/// Acceptance criteria and definition of done are unions in first-seen
/// order; the longer description wins, the earlier one on ties. Stories
/// without an epic name or summary are dropped.
pub fn merge_stories(candidates: Vec<Story>) -> Vec<Story> {
    let mut merged: Vec<Story> = Vec::new();
    let mut index: HashMap<StoryKey, usize> = HashMap::new();

    for candidate in candidates {
        let key = candidate.key();
        if key.epic().is_empty() || key.summary().is_empty() {
            continue;
        }

        let slot = match index.get(&key) {
            Some(&slot) => slot,
            None => {
                index.insert(key, merged.len());
                merged.push(Story {
                    epic_name: candidate.epic_name.trim().to_string(),
                    summary: candidate.summary.trim().to_string(),
                    source_chunk_id: candidate.source_chunk_id.clone(),
                    ..Story::default()
                });
                merged.len() - 1
            }
        };

        let target = &mut merged[slot];
        keep_longer(&mut target.description, &candidate.description);
        extend_unique(&mut target.acceptance_criteria, &candidate.acceptance_criteria);
        extend_unique(&mut target.definition_of_done, &candidate.definition_of_done);
        if target.source_chunk_id.is_empty() {
            target.source_chunk_id = candidate.source_chunk_id;
        }
    }

    merged
}
