//! CLI argument definitions using clap
//!
//! Commands:
//! - hyprknot serve [--config <path>]
//! - hyprknot init-config --output <path> [--force]
//! - hyprknot check-config [--config <path>]

use clap::{Parser, Subcommand};
use std::path::PathBuf;

/// hyprknot - HTTP API for Knot DNS zone records
#[derive(Parser, Debug)]
#[command(name = "hyprknot")]
#[command(version, about, long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Start the HTTP API server
    Serve {
        /// Path to configuration file; defaults apply when absent
        #[arg(long)]
        config: Option<PathBuf>,
    },

    /// Write a configuration file with every default filled in
    InitConfig {
        /// Where to write the file
        #[arg(long)]
        output: PathBuf,

        /// Overwrite an existing file
        #[arg(long)]
        force: bool,
    },

    /// Load and validate a configuration, then print the effective values
    CheckConfig {
        /// Path to configuration file; defaults apply when absent
        #[arg(long)]
        config: Option<PathBuf>,
    },
}

impl Cli {
    /// Parse command line arguments
    pub fn parse_args() -> Self {
        Cli::parse()
    }
}
