mod archive;
mod builder;
mod bundle;
mod cli;
mod cli_utils;
mod commands;
mod config;
mod config_discovery;
mod consumer;
mod logging;
mod merger;
mod store;
mod tools;

use anyhow::Result;
use clap::Parser;

use cli::{Cli, Commands};

#[tokio::main]
async fn main() -> Result<()> {
    // Initialize structured logging
    logging::init();

    // Parse CLI arguments
    let cli = Cli::parse();

    // Dispatch to appropriate command handler
    match cli.command {
        Commands::Build(args) => commands::build::run(args),
        Commands::Restore(args) => commands::restore::run(args),
        Commands::Serve(args) => commands::serve::run(args).await,
        Commands::Config(args) => commands::config::run(args.command),
        Commands::Doctor(args) => commands::doctor::run(args),
    }
}
