//! Generation client: backend calls with retry and JSON recovery.

pub mod client;
pub mod json_repair;
pub mod retry;

pub use client::{GenerationClient, GenerationClientConfig, GenerationError};
pub use retry::RetryPolicy;
