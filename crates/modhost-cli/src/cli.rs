//! CLI argument parsing using clap derive

use std::path::PathBuf;

use clap::{Parser, Subcommand};

/// modhost - bootstrap a pluggable module host
#[derive(Parser, Debug)]
#[command(name = "modhost")]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    /// Enable verbose output
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Configuration file (TOML, JSON or YAML)
    #[arg(short, long, global = true)]
    pub config: Option<PathBuf>,

    /// The command to run (defaults to `boot`)
    #[command(subcommand)]
    pub command: Option<Commands>,
}

/// Available commands
#[derive(Subcommand, Debug, Clone, PartialEq, Eq)]
pub enum Commands {
    /// Install configured modules and extensions, then start applications
    Boot,

    /// Resolve an artifact locator and print its local path
    Resolve {
        /// Path, URL or repository coordinate
        locator: String,
    },

    /// Print the extension descriptor behind a locator
    Inspect {
        /// Path, URL or repository coordinate
        locator: String,

        /// Output as JSON for scripting
        #[arg(long)]
        json: bool,
    },

    /// Boot the host, load extensions and print what is installed
    ///
    /// Examples:
    ///   modhost load features.json
    ///   modhost load a.json b.tar --remove a.json --recursive
    Load {
        /// Extension locators, loaded in order
        #[arg(required = true)]
        locators: Vec<String>,

        /// Extension to remove after loading
        #[arg(long)]
        remove: Option<String>,

        /// Also remove inner extensions and uninstall modules
        #[arg(long, requires = "remove")]
        recursive: bool,
    },
}
