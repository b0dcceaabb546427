//! appshell - dev-mode file sync and hot reload for App Shell mini-apps.

mod actor;
mod bridge;
mod bundle;
mod cli;
mod config;
mod core;
mod logger;
mod panel;
mod utils;

use anyhow::Result;
use clap::{ColorChoice, Parser};
use cli::{Cli, Commands};
use config::AppConfig;

fn main() -> Result<()> {
    // Setup global Ctrl+C handler (before any blocking operations)
    core::setup_shutdown_handler()?;

    let cli = Cli::parse();

    match cli.color {
        ColorChoice::Always => owo_colors::set_override(true),
        ColorChoice::Never => owo_colors::set_override(false),
        ColorChoice::Auto => {}
    }
    logger::set_verbose(cli.verbose);

    let config = AppConfig::load(&cli)?;

    match &cli.command {
        Commands::Watch { serve, .. } => cli::watch::watch(config, *serve),
        Commands::Snapshot { .. } => cli::bundle::snapshot(&config),
        Commands::Restore { bundle, target } => {
            cli::bundle::restore(&config, bundle.as_deref(), target.as_deref())
        }
        Commands::Init => cli::project::init(&config),
        Commands::Url { remote, .. } => cli::project::url(&config, remote.as_deref()),
        Commands::Publish {
            name,
            description,
            dry_run,
            ..
        } => cli::project::publish(&config, name, description, *dry_run),
    }
}
