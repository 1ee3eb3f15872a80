//! Observability for hyprknot
//!
//! Structured logs through `tracing`. Every component logs with the
//! `tracing` macros; this module only installs the subscriber.
//!
//! # Usage
//!
//! ```ignore
//! use hyprknot::config::LogConfig;
//! use hyprknot::observability::init_logging;
//!
//! init_logging(&LogConfig::default())?;
//! tracing::info!(zone = "example.com.", "reloaded zone");
//! ```

mod logger;

pub use logger::{init_logging, LogFormat, LogOutput};

use std::io;
use std::path::PathBuf;

use thiserror::Error;

/// Result type for logging setup
pub type ObservabilityResult<T> = Result<T, ObservabilityError>;

/// Logging setup errors
#[derive(Debug, Error)]
pub enum ObservabilityError {
    #[error("failed to open log file {}: {source}", path.display())]
    OpenLogFile { path: PathBuf, source: io::Error },

    #[error("failed to install log subscriber: {0}")]
    Init(String),
}
