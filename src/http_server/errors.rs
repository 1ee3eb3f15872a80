//! # HTTP API Errors
//!
//! Maps zone errors onto status codes and a `{ "error", "code" }` body.

use axum::extract::rejection::JsonRejection;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde::Serialize;
use thiserror::Error;
use tracing::error;

use crate::zone::ZoneError;

/// Result type for route handlers
pub type ApiResult<T> = Result<T, ApiError>;

/// HTTP API errors
#[derive(Debug, Clone, Error)]
pub enum ApiError {
    // ==================
    // Client Errors (4xx)
    // ==================
    /// Malformed path, body or record
    #[error("{0}")]
    BadRequest(String),

    /// Missing or wrong API key
    #[error("{0}")]
    Unauthorized(String),

    /// Zone outside the allow-list
    #[error("Access to zone not allowed")]
    Forbidden,

    /// Record not found
    #[error("{0}")]
    NotFound(String),

    /// Client exceeded its request budget
    #[error("Rate limit exceeded")]
    RateLimited,

    // ==================
    // Server Errors (5xx)
    // ==================
    /// Server misconfiguration or unexpected failure
    #[error("{0}")]
    Internal(String),

    /// knotc failed; the diagnostic text stays in the logs
    #[error("DNS control plane command '{0}' failed")]
    ControlPlane(String),
}

impl ApiError {
    /// Get HTTP status code for this error
    pub fn status_code(&self) -> StatusCode {
        match self {
            ApiError::BadRequest(_) => StatusCode::BAD_REQUEST,
            ApiError::Unauthorized(_) => StatusCode::UNAUTHORIZED,
            ApiError::Forbidden => StatusCode::FORBIDDEN,
            ApiError::NotFound(_) => StatusCode::NOT_FOUND,
            ApiError::RateLimited => StatusCode::TOO_MANY_REQUESTS,
            ApiError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
            ApiError::ControlPlane(_) => StatusCode::BAD_GATEWAY,
        }
    }
}

impl From<ZoneError> for ApiError {
    fn from(err: ZoneError) -> Self {
        match err {
            ZoneError::AccessDenied(_) => ApiError::Forbidden,
            ZoneError::Validation(e) => ApiError::BadRequest(e.to_string()),
            e @ ZoneError::NotFound { .. } => ApiError::NotFound(e.to_string()),
            ZoneError::ControlPlane { command, detail } => {
                error!(command = %command, detail = %detail, "control plane command failed");
                ApiError::ControlPlane(command)
            }
        }
    }
}

impl From<JsonRejection> for ApiError {
    fn from(rejection: JsonRejection) -> Self {
        ApiError::BadRequest(format!("Invalid request body: {}", rejection.body_text()))
    }
}

/// Error response body
#[derive(Debug, Serialize)]
pub struct ErrorResponse {
    pub error: String,
    pub code: u16,
}

impl From<ApiError> for ErrorResponse {
    fn from(err: ApiError) -> Self {
        Self {
            code: err.status_code().as_u16(),
            error: err.to_string(),
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status_code();
        let body = Json(ErrorResponse::from(self));
        (status, body).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::zone::ValidationError;

    #[test]
    fn test_status_codes() {
        assert_eq!(ApiError::BadRequest("x".into()).status_code(), StatusCode::BAD_REQUEST);
        assert_eq!(ApiError::Forbidden.status_code(), StatusCode::FORBIDDEN);
        assert_eq!(ApiError::RateLimited.status_code(), StatusCode::TOO_MANY_REQUESTS);
        assert_eq!(ApiError::ControlPlane("zone-set".into()).status_code(), StatusCode::BAD_GATEWAY);
    }

    #[test]
    fn test_zone_error_mapping() {
        let denied = ApiError::from(ZoneError::AccessDenied("other.org.".into()));
        assert_eq!(denied.status_code(), StatusCode::FORBIDDEN);

        let invalid = ApiError::from(ZoneError::from(ValidationError::new("data", "bad address")));
        assert_eq!(invalid.status_code(), StatusCode::BAD_REQUEST);

        let missing = ApiError::from(ZoneError::NotFound {
            zone: "example.com".into(),
            name: "www".into(),
            record_type: "A".into(),
        });
        assert_eq!(missing.status_code(), StatusCode::NOT_FOUND);
    }

    #[test]
    fn test_control_plane_detail_not_echoed() {
        let err = ApiError::from(ZoneError::control_plane("zone-set", "error: socket /run/knot/knot.sock"));
        let body = ErrorResponse::from(err);
        assert_eq!(body.code, 502);
        assert!(body.error.contains("zone-set"));
        assert!(!body.error.contains("socket"));
    }
}
