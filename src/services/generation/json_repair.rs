//! Local, model-free recovery of JSON from model output.
//!
//! Steps run in order and the first one that parses wins: direct parse,
//! code-fence stripping, span extraction, then in-string control
//! character escaping.

use regex::Regex;
use serde_json::Value;
use std::sync::LazyLock;

static JSON_SPAN: LazyLock<Option<Regex>> =
    LazyLock::new(|| Regex::new(r"(?s)\{.*\}|\[.*\]").ok());

static CODE_FENCE: LazyLock<Option<Regex>> =
    LazyLock::new(|| Regex::new(r"(?s)```[a-zA-Z0-9_-]*\s*\n?(.*?)```").ok());

/// Try every local recovery step on `raw`.
///
/// On failure returns the diagnostic of the last parse attempt.
pub fn recover_json(raw: &str) -> Result<Value, String> {
    let mut diagnostic = match serde_json::from_str::<Value>(raw.trim()) {
        Ok(value) => return Ok(value),
        Err(err) => err.to_string(),
    };

    let unfenced = strip_code_fences(raw);
    if unfenced != raw.trim() {
        match serde_json::from_str::<Value>(&unfenced) {
            Ok(value) => return Ok(value),
            Err(err) => diagnostic = err.to_string(),
        }
    }

    let span = extract_json_span(&unfenced).unwrap_or(unfenced.as_str());
    if span != unfenced {
        match serde_json::from_str::<Value>(span) {
            Ok(value) => return Ok(value),
            Err(err) => diagnostic = err.to_string(),
        }
    }

    let repaired = escape_control_chars_in_strings(span);
    if repaired != span {
        match serde_json::from_str::<Value>(&repaired) {
            Ok(value) => return Ok(value),
            Err(err) => diagnostic = err.to_string(),
        }
    }

    Err(diagnostic)
}

/// Remove a surrounding Markdown code fence, keeping its body.
pub fn strip_code_fences(text: &str) -> String {
    let trimmed = text.trim();
    if let Some(captures) = CODE_FENCE.as_ref().and_then(|re| re.captures(trimmed)) {
        if let Some(body) = captures.get(1) {
            return body.as_str().trim().to_string();
        }
    }
    trimmed.to_string()
}

/// The first `{...}` or `[...]` span, greedy across lines.
pub fn extract_json_span(text: &str) -> Option<&str> {
    JSON_SPAN
        .as_ref()
        .and_then(|re| re.find(text))
        .map(|m| m.as_str())
}

/// Escape raw newline, carriage return and tab characters that appear
/// inside JSON string literals. Everything else is left untouched.
pub fn escape_control_chars_in_strings(text: &str) -> String {
    let mut out = String::with_capacity(text.len() + 16);
    let mut in_string = false;
    let mut escaped = false;

    for c in text.chars() {
        if in_string {
            if escaped {
                escaped = false;
                out.push(c);
                continue;
            }
            match c {
                '\\' => {
                    escaped = true;
                    out.push(c);
                }
                '"' => {
                    in_string = false;
                    out.push(c);
                }
                '\n' => out.push_str("\\n"),
                '\r' => out.push_str("\\r"),
                '\t' => out.push_str("\\t"),
                _ => out.push(c),
            }
        } else {
            if c == '"' {
                in_string = true;
            }
            out.push(c);
        }
    }

    out
}
