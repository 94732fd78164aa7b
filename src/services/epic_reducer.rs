//! Merge of candidate epics by identity key (the REDUCE step).

use std::collections::HashMap;

use crate::domain::models::text::extend_unique;
use crate::domain::models::{Epic, EpicKey};

/// Collapse candidates sharing an [`EpicKey`] into one epic each.
///
/// Groups keep first-seen order. List fields are unions in first-seen
/// order; description and summary keep the longest value, the earlier one
/// on ties; assumptions keep the first non-empty value. Candidates with an
/// empty name are dropped. Merging a merged result returns it unchanged.
pub fn merge_epics(candidates: Vec<Epic>) -> Vec<Epic> {
    let mut merged: Vec<Epic> = Vec::new();
    let mut index: HashMap<EpicKey, usize> = HashMap::new();

    for candidate in candidates {
        let key = candidate.key();
        if key.is_empty() {
            continue;
        }

        match index.get(&key) {
            Some(&slot) => absorb(&mut merged[slot], &candidate),
            None => {
                index.insert(key, merged.len());
                let mut seed = Epic {
                    epic_name: candidate.epic_name.trim().to_string(),
                    ..Epic::default()
                };
                absorb(&mut seed, &candidate);
                merged.push(seed);
            }
        }
    }

    merged
}

fn absorb(target: &mut Epic, other: &Epic) {
    keep_longer(&mut target.description, &other.description);

    if let Some(incoming) = other.summary.as_deref().filter(|s| !s.trim().is_empty()) {
        if let Some(current) = target.summary.as_mut() {
            keep_longer(current, incoming);
        } else {
            target.summary = Some(incoming.to_string());
        }
    }

    if target.assumptions.as_deref().map_or(true, |a| a.trim().is_empty()) {
        if let Some(assumptions) = other.assumptions.as_ref().filter(|a| !a.trim().is_empty()) {
            target.assumptions = Some(assumptions.clone());
        }
    }

    extend_unique(&mut target.business_objectives, &other.business_objectives);
    extend_unique(&mut target.scope.in_scope, &other.scope.in_scope);
    extend_unique(&mut target.scope.out_of_scope, &other.scope.out_of_scope);
    extend_unique(&mut target.acceptance_criteria, &other.acceptance_criteria);
    extend_unique(&mut target.definition_of_done, &other.definition_of_done);
    extend_unique(&mut target.covered_requirements, &other.covered_requirements);
    extend_unique(&mut target.source_chunk_ids, &other.source_chunk_ids);
}

/// Replace `current` with `incoming` only if strictly longer.
pub(crate) fn keep_longer(current: &mut String, incoming: &str) {
    if incoming.chars().count() > current.chars().count() {
        *current = incoming.to_string();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;
    use std::collections::BTreeSet;

    fn epic(name: &str, description: &str, covered: &[&str], chunk: &str) -> Epic {
        Epic {
            covered_requirements: covered.iter().map(|s| s.to_string()).collect(),
            source_chunk_ids: vec![chunk.to_string()],
            ..Epic::new(name, description)
        }
    }

    #[test]
    fn test_merge_by_normalized_name() {
        let merged = merge_epics(vec![
            epic("User Management", "Manage users", &["signup"], "C-1"),
            epic("Billing", "Invoices", &["invoice"], "C-2"),
            epic(" user  MANAGEMENT", "Manage user accounts end to end", &["login", "signup"], "C-3"),
        ]);

        assert_eq!(merged.len(), 2);
        assert_eq!(merged[0].epic_name, "User Management");
        assert_eq!(merged[0].description, "Manage user accounts end to end");
        assert_eq!(merged[0].covered_requirements, vec!["signup", "login"]);
        assert_eq!(merged[0].source_chunk_ids, vec!["C-1", "C-3"]);
        assert_eq!(merged[1].epic_name, "Billing");
    }

    #[test]
    fn test_ties_keep_first_description_and_assumptions() {
        let mut first = epic("A", "same", &[], "C-1");
        first.assumptions = Some(String::new());
        let mut second = epic("a", "SAME", &[], "C-2");
        second.assumptions = Some("EU only".to_string());
        second.summary = Some("short".to_string());

        let merged = merge_epics(vec![first, second]);
        assert_eq!(merged[0].description, "same");
        assert_eq!(merged[0].assumptions.as_deref(), Some("EU only"));
        assert_eq!(merged[0].summary.as_deref(), Some("short"));
    }

    #[test]
    fn test_empty_names_dropped() {
        let merged = merge_epics(vec![epic("   ", "x", &[], "C-1"), epic("B", "y", &[], "C-2")]);
        assert_eq!(merged.len(), 1);
        assert_eq!(merged[0].epic_name, "B");
    }

    fn arb_epic() -> impl Strategy<Value = Epic> {
        (
            prop::sample::select(vec!["Billing", "billing", "Reporting", "Users", " USERS "]),
            "[a-z ]{1,12}",
            prop::collection::vec(prop::sample::select(vec!["r1", "r2", "r3", "r4"]), 0..4),
            prop::sample::select(vec!["C-1", "C-2", "C-3"]),
        )
            .prop_map(|(name, description, covered, chunk)| {
                let covered: Vec<&str> = covered;
                epic(name, &description, &covered, chunk)
            })
    }

    proptest! {
        #[test]
        fn prop_merge_is_idempotent(epics in prop::collection::vec(arb_epic(), 0..12)) {
            let once = merge_epics(epics);
            let twice = merge_epics(once.clone());
            prop_assert_eq!(once, twice);
        }

        #[test]
        fn prop_merge_keys_and_unions_ignore_order(
            epics in prop::collection::vec(arb_epic(), 1..12),
            seed in any::<u64>(),
        ) {
            let mut shuffled = epics.clone();
            let len = shuffled.len();
            shuffled.rotate_left((seed as usize) % len);
            if seed % 2 == 0 {
                shuffled.reverse();
            }

            let summarize = |merged: Vec<Epic>| {
                merged
                    .into_iter()
                    .map(|e| {
                        let covered: BTreeSet<String> = e.covered_requirements.into_iter().collect();
                        let chunks: BTreeSet<String> = e.source_chunk_ids.into_iter().collect();
                        (EpicKey::new(&e.epic_name), covered, chunks)
                    })
                    .collect::<BTreeSet<_>>()
            };

            prop_assert_eq!(summarize(merge_epics(epics)), summarize(merge_epics(shuffled)));
        }

        #[test]
        fn prop_merged_keys_are_unique(epics in prop::collection::vec(arb_epic(), 0..12)) {
            let merged = merge_epics(epics);
            let keys: BTreeSet<EpicKey> = merged.iter().map(Epic::key).collect();
            prop_assert_eq!(keys.len(), merged.len());
        }
    }
}
