//! Text helpers shared by identity keys and content-addressed caches.

use sha1::{Digest, Sha1};

/// Collapse a string to its identity form: lowercase, single spaces, trimmed.
pub fn normalize_key(value: &str) -> String {
    value
        .split_whitespace()
        .map(str::to_lowercase)
        .collect::<Vec<_>>()
        .join(" ")
}

/// Collapse internal whitespace runs to one space and trim, preserving case.
pub fn collapse_whitespace(value: &str) -> String {
    value.split_whitespace().collect::<Vec<_>>().join(" ")
}

/// Lowercase hex SHA-1 digest of `input`.
pub fn sha1_hex(input: &str) -> String {
    hex::encode(Sha1::digest(input.as_bytes()))
}

/// Append `items` to `target`, skipping values already present.
pub fn extend_unique(target: &mut Vec<String>, items: &[String]) {
    for item in items {
        if !target.contains(item) {
            target.push(item.clone());
        }
    }
}
