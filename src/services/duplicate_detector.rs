//! Advisory duplicate detection against existing tracker issues.

use similar::{DiffOp, TextDiff};
use std::sync::Arc;
use tracing::{debug, instrument};

use crate::domain::models::{DuplicateMatch, DuplicatesConfig, ExistingIssue, Story, TrackerConfig};
use crate::domain::ports::{IssueTracker, TrackerError};

/// Issue types compared against generated stories.
pub const DUPLICATE_ISSUE_TYPES: [&str; 3] = ["Story", "Task", "Bug"];

/// Character-level sequence ratio `2*M/T` of the lowercased strings, where
/// `M` counts matched characters and `T` is the combined length.
/// Two empty strings are identical.
#[allow(clippy::cast_precision_loss)]
pub fn similarity(a: &str, b: &str) -> f64 {
    let a = a.to_lowercase();
    let b = b.to_lowercase();
    let total = a.chars().count() + b.chars().count();
    if total == 0 {
        return 1.0;
    }

    let diff = TextDiff::from_chars(a.as_str(), b.as_str());
    let matched: usize = diff
        .ops()
        .iter()
        .map(|op| match op {
            DiffOp::Equal { len, .. } => *len,
            _ => 0,
        })
        .sum();
    2.0 * matched as f64 / total as f64
}

fn round2(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}

/// Existing issues whose summary is at least `threshold` similar to the
/// story summary, in input order.
pub fn detect_duplicates(
    story: &Story,
    existing: &[ExistingIssue],
    threshold: f64,
) -> Vec<DuplicateMatch> {
    existing
        .iter()
        .filter_map(|issue| {
            let score = similarity(&story.summary, &issue.summary);
            (score >= threshold).then(|| DuplicateMatch {
                jira_key: issue.key.clone(),
                similarity: round2(score),
            })
        })
        .collect()
}

/// Duplicate lookup settings.
#[derive(Debug, Clone, PartialEq)]
pub struct DuplicateServiceConfig {
    pub threshold: f64,
    pub lookback_days: u32,
    pub max_results: u32,
}

impl Default for DuplicateServiceConfig {
    fn default() -> Self {
        Self::new(&DuplicatesConfig::default(), &TrackerConfig::default())
    }
}

impl DuplicateServiceConfig {
    pub fn new(duplicates: &DuplicatesConfig, tracker: &TrackerConfig) -> Self {
        Self {
            threshold: duplicates.threshold,
            lookback_days: tracker.lookback_days,
            max_results: tracker.max_results,
        }
    }
}

/// Fetches recent issues from the tracker and scores them against a story.
pub struct DuplicateService {
    tracker: Arc<dyn IssueTracker>,
    config: DuplicateServiceConfig,
}

impl DuplicateService {
    pub fn new(tracker: Arc<dyn IssueTracker>, config: DuplicateServiceConfig) -> Self {
        Self { tracker, config }
    }

    #[instrument(skip(self, story), fields(summary = %story.summary))]
    pub async fn check_story(
        &self,
        story: &Story,
        threshold: Option<f64>,
    ) -> Result<Vec<DuplicateMatch>, TrackerError> {
        let threshold = threshold.unwrap_or(self.config.threshold);
        let existing = self
            .tracker
            .recent_issues(
                &DUPLICATE_ISSUE_TYPES,
                self.config.lookback_days,
                self.config.max_results,
            )
            .await?;

        let matches = detect_duplicates(story, &existing, threshold);
        debug!(
            compared = existing.len(),
            matches = matches.len(),
            threshold,
            "duplicate check finished"
        );
        Ok(matches)
    }
}
