//! CLI module for hyprknot
//!
//! Provides command-line interface for:
//! - serve: Run the HTTP API in front of knotc
//! - init-config: Write a default configuration file
//! - check-config: Validate a configuration file

mod args;
mod commands;
mod errors;

pub use args::{Cli, Command};
pub use commands::{build_state, build_store, check_config, init_config, run, run_command, serve};
pub use errors::{CliError, CliResult};
