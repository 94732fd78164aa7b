//! CLI type definitions
//!
//! This module contains clap command structures that define the CLI interface.

use clap::{Parser, Subcommand};
use std::path::PathBuf;

#[derive(Parser)]
#[command(name = "storyforge")]
#[command(about = "Storyforge - grounded Epics and Stories from requirements documents", long_about = None)]
#[command(version)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// Output in JSON format
    #[arg(short, long, global = true)]
    pub json: bool,

    /// Configuration file (defaults to .storyforge/config.yaml)
    #[arg(short, long, global = true, env = "STORYFORGE_CONFIG")]
    pub config: Option<PathBuf>,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Load a requirements document and print its chunks
    Chunk {
        /// Requirements file (.txt, .csv or .pdf)
        file: PathBuf,
    },

    /// Generate merged epics from a requirements document
    Epics {
        /// Requirements file (.txt, .csv or .pdf)
        file: PathBuf,

        /// Retrieval query (defaults to retrieval.epic_query)
        #[arg(short, long)]
        query: Option<String>,

        /// Number of chunks to generate from
        #[arg(short = 'k', long)]
        top_k: Option<usize>,
    },

    /// Generate merged stories for one epic
    Stories {
        /// Requirements file (.txt, .csv or .pdf)
        file: PathBuf,

        /// Epic name the stories belong to
        #[arg(short, long)]
        epic: String,

        /// Epic description given to the model
        #[arg(short, long, default_value = "")]
        description: String,

        /// Number of chunks to generate from
        #[arg(short = 'k', long)]
        top_k: Option<usize>,
    },

    /// Compare a story summary with recent tracker issues
    Duplicates {
        /// Story summary to compare
        #[arg(short, long)]
        summary: String,

        /// Minimum similarity to report (defaults to duplicates.threshold)
        #[arg(short, long)]
        threshold: Option<f64>,
    },

    /// Generate source files implementing a story
    Codegen {
        /// Story as a JSON file
        #[arg(short, long)]
        story: PathBuf,

        /// Stack key: python_fastapi, java_spring, node_express, react
        #[arg(long)]
        stack: String,

        /// Write the files under this directory instead of listing them
        #[arg(short, long)]
        out: Option<PathBuf>,
    },

    /// Issue tracker commands
    #[command(subcommand)]
    Tracker(TrackerCommands),

    /// Run the HTTP API
    Serve {
        /// Host to bind (defaults to server.host)
        #[arg(long)]
        host: Option<String>,

        /// Port to bind (defaults to server.port)
        #[arg(short, long)]
        port: Option<u16>,
    },
}

#[derive(Subcommand)]
pub enum TrackerCommands {
    /// Show the resolved tracker configuration (token hidden)
    Config,

    /// Check tracker connectivity and credentials
    Health,
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn test_cli_definition_is_valid() {
        Cli::command().debug_assert();
    }

    #[test]
    fn test_parse_epics_with_global_flags() {
        let cli = Cli::parse_from(["storyforge", "epics", "reqs.txt", "-k", "3", "--json"]);
        assert!(cli.json);
        match cli.command {
            Commands::Epics { file, query, top_k } => {
                assert_eq!(file, PathBuf::from("reqs.txt"));
                assert!(query.is_none());
                assert_eq!(top_k, Some(3));
            }
            _ => panic!("expected epics command"),
        }
    }

    #[test]
    fn test_parse_tracker_health() {
        let cli = Cli::parse_from(["storyforge", "tracker", "health"]);
        assert!(matches!(cli.command, Commands::Tracker(TrackerCommands::Health)));
    }
}
