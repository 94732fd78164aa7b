//! Command-line interface.

pub mod commands;
pub mod output;
pub mod types;

use anyhow::Result;
use std::path::Path;

pub use types::{Cli, Commands, TrackerCommands};

use crate::domain::models::Config;
use crate::infrastructure::config::ConfigLoader;

/// Load `--config PATH` when given, otherwise the project hierarchy.
pub fn load_config(path: Option<&Path>) -> Result<Config> {
    match path {
        Some(path) => ConfigLoader::load_from_file(path),
        None => ConfigLoader::load(),
    }
}

/// Print `err` on stderr (as JSON in JSON mode) and exit with status 1.
pub fn handle_error(err: anyhow::Error, json: bool) -> ! {
    if json {
        let body = serde_json::json!({ "error": format!("{err:#}") });
        eprintln!("{body}");
    } else {
        eprintln!("Error: {err:#}");
    }
    std::process::exit(1);
}
