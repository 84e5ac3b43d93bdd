//! Socratic tutor harness CLI entry point.

use anyhow::Result;
use clap::Parser;

use socratic_tutor::cli::commands::{judge, problems, run, session};
use socratic_tutor::cli::{handle_error, Cli, Commands};
use socratic_tutor::infrastructure::config::ConfigLoader;
use socratic_tutor::infrastructure::logging::LoggerImpl;

#[tokio::main]
async fn main() {
    let cli = Cli::parse();

    if let Err(err) = dispatch(cli.command, cli.config, cli.json).await {
        handle_error(err, cli.json);
    }
}

async fn dispatch(
    command: Commands,
    config_path: Option<std::path::PathBuf>,
    json: bool,
) -> Result<()> {
    let config = match config_path {
        Some(path) => ConfigLoader::load_from_file(path)?,
        None => ConfigLoader::load()?,
    };
    let _logger = LoggerImpl::init(&config.logging)?;

    match command {
        Commands::Run(args) => run::execute(args, &config, json).await,
        Commands::Problems(args) => problems::execute(args, &config, json),
        Commands::Judge(args) => judge::execute(args, &config, json).await,
        Commands::Session(args) => session::execute(args, &config, json).await,
    }
}
