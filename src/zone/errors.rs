//! # Zone Errors
//!
//! Error types for record parsing, validation and zone mutation.

use thiserror::Error;

/// Result type for zone operations
pub type ZoneResult<T> = Result<T, ZoneError>;

/// A record field rejected by validation.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("invalid {field}: {reason}")]
pub struct ValidationError {
    pub field: &'static str,
    pub reason: String,
}

impl ValidationError {
    pub fn new(field: &'static str, reason: impl Into<String>) -> Self {
        Self {
            field,
            reason: reason.into(),
        }
    }
}

/// A line of control-plane output that is not a usable record.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ParseError {
    /// Fewer than the four mandatory tokens
    #[error("expected at least 4 fields, found {0}")]
    TooFewFields(usize),

    /// TTL token is not an unsigned 32-bit integer
    #[error("invalid TTL: {0}")]
    InvalidTtl(String),

    /// Type token names a type this service does not manage
    #[error("unsupported record type: {0}")]
    UnsupportedType(String),

    /// MX line without a numeric preference
    #[error("invalid MX priority: {0}")]
    InvalidPriority(String),

    /// MX line missing its exchange
    #[error("MX record is missing its exchange")]
    MissingExchange,
}

/// Zone operation errors
#[derive(Debug, Clone, Error)]
pub enum ZoneError {
    // ==================
    // Caller Errors
    // ==================
    /// Zone is outside the configured allow-list
    #[error("zone not allowed: {0}")]
    AccessDenied(String),

    /// Record failed validation
    #[error("invalid record: {0}")]
    Validation(#[from] ValidationError),

    /// No record with the requested identity
    #[error("record not found: {name} {record_type} in zone {zone}")]
    NotFound {
        zone: String,
        name: String,
        record_type: String,
    },

    // ==================
    // Control Plane Errors
    // ==================
    /// knotc exited non-zero, could not be spawned, or timed out
    #[error("{command} failed: {detail}")]
    ControlPlane { command: String, detail: String },
}

impl ZoneError {
    /// Create a control-plane error for the given subcommand
    pub fn control_plane(command: impl Into<String>, detail: impl Into<String>) -> Self {
        Self::ControlPlane {
            command: command.into(),
            detail: detail.into(),
        }
    }

    /// Get error code for API responses
    pub fn code(&self) -> &'static str {
        match self {
            Self::AccessDenied(_) => "ACCESS_DENIED",
            Self::Validation(_) => "VALIDATION_ERROR",
            Self::NotFound { .. } => "NOT_FOUND",
            Self::ControlPlane { .. } => "CONTROL_PLANE_ERROR",
        }
    }
}
