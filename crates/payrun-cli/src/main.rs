//! payrun - command-line orchestrator for payment command files.

mod commands;
mod config;

use std::path::PathBuf;
use std::process::ExitCode;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

use crate::config::OrchestratorConfig;

#[derive(Parser)]
#[command(name = "payrun", version, about = "Run YAML-defined payment command files against the auth and payments services")]
struct Cli {
    /// Path to the command file
    #[arg(short, long, default_value = "commands.yaml")]
    file: PathBuf,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Execute every command in the file in order
    Execute,
    /// Parse and validate the file without executing anything
    Validate,
    /// List every variable reference and whether it resolves
    Variables,
    /// Check that both services are reachable
    Status,
    /// Provision users, groups, tokens, assets, and bank accounts
    Setup {
        /// Path to the setup file
        #[arg(default_value = "setup.yaml")]
        setup_file: PathBuf,
    },
}

#[tokio::main]
async fn main() -> Result<ExitCode> {
    // Load a .env file if present, before anything reads the environment
    dotenvy::dotenv().ok();

    let config = OrchestratorConfig::load();

    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_new(&config.log_filter).context("Invalid LOG_FILTER value")?,
        )
        .init();

    let cli = Cli::parse();

    let succeeded = match &cli.command {
        Command::Execute => commands::execute(&config, &cli.file).await?,
        Command::Validate => commands::validate(&cli.file).await?,
        Command::Variables => commands::variables(&cli.file).await?,
        Command::Status => commands::status(&config).await?,
        Command::Setup { setup_file } => commands::setup(&config, setup_file).await?,
    };

    Ok(if succeeded {
        ExitCode::SUCCESS
    } else {
        ExitCode::FAILURE
    })
}
