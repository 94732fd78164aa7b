use regex::{Captures, Regex};
use std::sync::LazyLock;

static PROVIDER_KEY: LazyLock<Option<Regex>> =
    LazyLock::new(|| Regex::new(r"\b(?:sk|gsk)[-_][A-Za-z0-9_-]{16,}").ok());

static AUTH_HEADER: LazyLock<Option<Regex>> =
    LazyLock::new(|| Regex::new(r"(?i)\b(Bearer|Basic)\s+[A-Za-z0-9+/=._-]+").ok());

static SECRET_FIELD: LazyLock<Option<Regex>> = LazyLock::new(|| {
    Regex::new(
        r#"(?i)(["']?(?:api_key|apikey|api_token|token|secret|password)["']?\s*[:=]\s*)["']?[^"'\s,}]+["']?"#,
    )
    .ok()
});

/// Remove API keys and credentials from text that is about to be logged or
/// returned to a client.
pub fn scrub_secrets(message: &str) -> String {
    let mut scrubbed = message.to_string();

    if let Some(pattern) = PROVIDER_KEY.as_ref() {
        scrubbed = pattern
            .replace_all(&scrubbed, "[API_KEY_REDACTED]")
            .into_owned();
    }
    if let Some(pattern) = AUTH_HEADER.as_ref() {
        scrubbed = pattern
            .replace_all(&scrubbed, |caps: &Captures| format!("{} [TOKEN_REDACTED]", &caps[1]))
            .into_owned();
    }
    if let Some(pattern) = SECRET_FIELD.as_ref() {
        scrubbed = pattern
            .replace_all(&scrubbed, |caps: &Captures| format!("{}[REDACTED]", &caps[1]))
            .into_owned();
    }

    scrubbed
}
