//! Spinners for long-running model calls.
//!
//! Spinners draw on stderr and are hidden in JSON mode so stdout stays
//! machine-readable.

use indicatif::{ProgressBar, ProgressStyle};
use std::time::Duration;

const SPINNER_TEMPLATE: &str = "[{elapsed_precise}] {spinner:.green} {msg}";
const SPINNER_CHARS: &str = "⠋⠙⠹⠸⠼⠴⠦⠧⠇⠏";

/// A ticking spinner with `message`, or a hidden bar when `hidden` is set.
pub fn create_spinner(message: impl Into<String>, hidden: bool) -> ProgressBar {
    if hidden {
        return ProgressBar::hidden();
    }

    let style = ProgressStyle::with_template(SPINNER_TEMPLATE)
        .unwrap_or_else(|_| ProgressStyle::default_spinner())
        .tick_chars(SPINNER_CHARS);

    let spinner = ProgressBar::new_spinner();
    spinner.set_style(style);
    spinner.set_message(message.into());
    spinner.enable_steady_tick(Duration::from_millis(100));
    spinner
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_hidden_spinner() {
        let spinner = create_spinner("working", true);
        assert!(spinner.is_hidden());
        spinner.finish_and_clear();
    }

    #[test]
    fn test_spinner_keeps_message() {
        let spinner = create_spinner("Generating epics", false);
        assert_eq!(spinner.message(), "Generating epics");
        spinner.finish_and_clear();
    }
}
