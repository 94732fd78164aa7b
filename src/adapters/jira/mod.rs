//! Jira issue tracker adapter.

pub mod client;
pub mod models;

pub use client::{JiraClient, JiraSettings};
