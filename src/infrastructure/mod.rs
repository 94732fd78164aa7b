//! Infrastructure layer module
//!
//! - Configuration management
//! - Logging infrastructure
//! - Requirements document ingestion

pub mod config;
pub mod ingestion;
pub mod logging;
