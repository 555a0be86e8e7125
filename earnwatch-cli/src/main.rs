//! earnwatch CLI entry point.

mod cli;
mod commands;
mod error;
mod output;

use clap::Parser;
use tracing_subscriber::EnvFilter;

use crate::cli::{Cli, Commands};
use crate::error::CliError;
use crate::output::OutputWriter;

#[tokio::main]
async fn main() {
    let cli = Cli::parse();

    // stdout carries command output; logs go to stderr.
    let level = cli.log_level.as_deref().unwrap_or("warn");
    let env_filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level));
    tracing_subscriber::fmt()
        .with_env_filter(env_filter)
        .with_writer(std::io::stderr)
        .init();

    if let Err(e) = run(cli).await {
        eprintln!("error: {}", e);
        std::process::exit(e.exit_code());
    }
}

async fn run(cli: Cli) -> Result<(), CliError> {
    let writer = OutputWriter::new(cli.output);
    let config_path = cli.config.as_path();

    match cli.command {
        Commands::Scan(args) => commands::scan::execute(args, config_path, &writer).await,
        Commands::Errors(args) => commands::errors::execute(args, config_path, &writer).await,
        Commands::Dismiss(args) => commands::dismiss::execute(args, config_path, &writer).await,
        Commands::Config(args) => commands::config::execute(args, config_path, &writer).await,
    }
}
