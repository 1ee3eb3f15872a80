//! CLI-specific error types
//!
//! Every CLI error ends the process with a non-zero status.

use std::io;
use std::path::PathBuf;

use thiserror::Error;

use crate::config::ConfigError;
use crate::observability::ObservabilityError;
use crate::zone::ZoneError;

/// CLI error
#[derive(Debug, Error)]
pub enum CliError {
    #[error(transparent)]
    Config(#[from] ConfigError),

    #[error(transparent)]
    Logging(#[from] ObservabilityError),

    #[error("Knot DNS health check failed: {0}")]
    KnotUnavailable(ZoneError),

    #[error("{} already exists, pass --force to overwrite", .0.display())]
    OutputExists(PathBuf),

    #[error("failed to create tokio runtime: {0}")]
    Runtime(io::Error),

    #[error("HTTP server failed: {0}")]
    Server(io::Error),

    #[error("failed to render configuration: {0}")]
    Render(#[from] serde_json::Error),
}

impl CliError {
    /// Get the error code string
    pub fn code(&self) -> &'static str {
        match self {
            Self::Config(_) => "HYPRKNOT_CLI_CONFIG_ERROR",
            Self::Logging(_) => "HYPRKNOT_CLI_LOGGING_ERROR",
            Self::KnotUnavailable(_) => "HYPRKNOT_CLI_KNOT_UNAVAILABLE",
            Self::OutputExists(_) => "HYPRKNOT_CLI_OUTPUT_EXISTS",
            Self::Runtime(_) | Self::Server(_) => "HYPRKNOT_CLI_BOOT_FAILED",
            Self::Render(_) => "HYPRKNOT_CLI_IO_ERROR",
        }
    }
}

/// CLI result type
pub type CliResult<T> = Result<T, CliError>;
