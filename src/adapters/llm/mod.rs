//! Generation backend adapters.

pub mod mock;
pub mod openai_compat;

pub use mock::ScriptedBackend;
pub use openai_compat::{OpenAiCompatBackend, OpenAiCompatConfig};
