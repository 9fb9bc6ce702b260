//! modhost CLI
//!
//! Bootstraps the module host from configuration and exposes the extension
//! manager's load and remove operations on the command line.

mod cli;
mod commands;
mod error;
mod host;
mod logging;

use clap::Parser;
use colored::Colorize;

use cli::{Cli, Commands};
use error::Result;
use host::Host;

fn main() {
    if let Err(e) = run() {
        eprintln!("{}: {}", "error".red().bold(), e);
        std::process::exit(1);
    }
}

fn run() -> Result<()> {
    let cli = Cli::parse();

    if let Err(e) = logging::init(cli.verbose) {
        eprintln!("{}: failed to initialise logging: {e}", "warning".yellow().bold());
    }
    tracing::debug!("Verbose mode enabled");

    let cwd = std::env::current_dir()?;
    let (config, source) = modhost_meta::load_host_config(cli.config.as_deref(), &cwd)?;
    tracing::debug!("Configuration source: {source:?}");
    let host = Host::new(config, &cwd)?;

    match cli.command.unwrap_or(Commands::Boot) {
        Commands::Boot => commands::run_boot(&host),
        Commands::Resolve { locator } => commands::run_resolve(&host, &locator),
        Commands::Inspect { locator, json } => commands::run_inspect(&host, &locator, json),
        Commands::Load {
            locators,
            remove,
            recursive,
        } => commands::run_load(&host, &locators, remove.as_deref(), recursive),
    }
}
