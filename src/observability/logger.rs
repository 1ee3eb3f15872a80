//! Subscriber setup from `LogConfig`
//!
//! - `RUST_LOG` wins over the configured level
//! - JSON lines by default, human-readable text on request
//! - stdout, stderr or an append-mode file

use std::fs::OpenOptions;
use std::io;
use std::path::PathBuf;
use std::sync::Mutex;

use tracing_subscriber::fmt::writer::BoxMakeWriter;
use tracing_subscriber::EnvFilter;

use super::{ObservabilityError, ObservabilityResult};
use crate::config::LogConfig;

/// Line format
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LogFormat {
    Json,
    Text,
}

impl LogFormat {
    /// Unknown values fall back to JSON
    pub fn parse(raw: &str) -> Self {
        if raw.eq_ignore_ascii_case("text") {
            LogFormat::Text
        } else {
            LogFormat::Json
        }
    }
}

/// Log destination
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LogOutput {
    Stdout,
    Stderr,
    File(PathBuf),
}

impl LogOutput {
    pub fn parse(raw: &str) -> Self {
        match raw.trim() {
            "" | "stdout" => LogOutput::Stdout,
            "stderr" => LogOutput::Stderr,
            path => LogOutput::File(PathBuf::from(path)),
        }
    }

    fn make_writer(&self) -> ObservabilityResult<BoxMakeWriter> {
        Ok(match self {
            LogOutput::Stdout => BoxMakeWriter::new(io::stdout),
            LogOutput::Stderr => BoxMakeWriter::new(io::stderr),
            LogOutput::File(path) => {
                let file = OpenOptions::new()
                    .create(true)
                    .append(true)
                    .open(path)
                    .map_err(|source| ObservabilityError::OpenLogFile {
                        path: path.clone(),
                        source,
                    })?;
                BoxMakeWriter::new(Mutex::new(file))
            }
        })
    }
}

/// Install the global subscriber. Fails if one is already installed.
pub fn init_logging(config: &LogConfig) -> ObservabilityResult<()> {
    let filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(config.level.to_ascii_lowercase()))
        .unwrap_or_else(|_| EnvFilter::new("info"));

    let output = LogOutput::parse(&config.output);
    let ansi = matches!(output, LogOutput::Stdout | LogOutput::Stderr);
    let builder = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(output.make_writer()?);

    let result = match LogFormat::parse(&config.format) {
        LogFormat::Json => builder.json().try_init(),
        LogFormat::Text => builder.with_ansi(ansi).try_init(),
    };
    result.map_err(|e| ObservabilityError::Init(e.to_string()))
}
