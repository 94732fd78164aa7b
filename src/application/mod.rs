//! Application wiring.

pub mod storyforge;

pub use storyforge::Storyforge;
