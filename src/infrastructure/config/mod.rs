//! Layered settings for storyforge.
//!
//! Defaults come from `Config::default()`, then `.storyforge/config.yaml`,
//! then `.storyforge/local.yaml`, then `STORYFORGE_*` environment variables.

pub mod loader;

pub use loader::{ConfigError, ConfigLoader};
