//! Storyforge CLI entry point.

use clap::Parser;

use storyforge::cli::commands;
use storyforge::cli::{handle_error, load_config, Cli, Commands};
use storyforge::infrastructure::logging::{LogConfig, LoggerImpl};

#[tokio::main]
async fn main() {
    let cli = Cli::parse();

    let config = match load_config(cli.config.as_deref()) {
        Ok(config) => config,
        Err(err) => handle_error(err, cli.json),
    };

    let _logger = match LoggerImpl::init(&LogConfig::from(&config.logging)) {
        Ok(logger) => logger,
        Err(err) => handle_error(err, cli.json),
    };

    let result = match cli.command {
        Commands::Chunk { file } => commands::chunk::execute(&config, &file, cli.json),
        Commands::Epics { file, query, top_k } => {
            commands::epics::execute(config, &file, query, top_k, cli.json).await
        }
        Commands::Stories {
            file,
            epic,
            description,
            top_k,
        } => commands::stories::execute(config, &file, epic, description, top_k, cli.json).await,
        Commands::Duplicates { summary, threshold } => {
            commands::duplicates::execute(config, summary, threshold, cli.json).await
        }
        Commands::Codegen { story, stack, out } => {
            commands::codegen::execute(config, &story, stack, out, cli.json).await
        }
        Commands::Tracker(command) => commands::tracker::execute(&config, command, cli.json).await,
        Commands::Serve { host, port } => commands::serve::execute(config, host, port).await,
    };

    if let Err(err) = result {
        handle_error(err, cli.json);
    }
}
