//! Domain layer for storyforge
//!
//! Core records (chunks, epics, stories), their identity keys, and the
//! port traits that backends must implement.

pub mod errors;
pub mod models;
pub mod ports;

pub use errors::{DomainError, DomainResult};
