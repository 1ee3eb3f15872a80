//! Request middleware: API-key check, security headers and request ids.

use std::sync::Arc;

use axum::extract::{Request, State};
use axum::http::{header, HeaderName, HeaderValue};
use axum::middleware::Next;
use axum::response::{IntoResponse, Response};
use subtle::{Choice, ConstantTimeEq};
use tower_http::request_id::{MakeRequestId, RequestId};
use tracing::warn;
use uuid::Uuid;

use super::errors::ApiError;
use crate::config::AuthConfig;

pub const API_KEY_HEADER: &str = "x-api-key";
pub const REQUEST_ID_HEADER: &str = "x-request-id";

/// Configured API keys
#[derive(Debug, Clone)]
pub struct ApiKeyAuth {
    enabled: bool,
    keys: Vec<String>,
}

impl ApiKeyAuth {
    pub fn new(enabled: bool, keys: Vec<String>) -> Self {
        Self { enabled, keys }
    }

    pub fn from_config(config: &AuthConfig) -> Self {
        Self::new(config.enabled, config.api_keys.clone())
    }

    pub fn disabled() -> Self {
        Self::new(false, Vec::new())
    }

    /// Check a presented key against every configured key
    pub fn authorize(&self, presented: Option<&str>) -> Result<(), ApiError> {
        if !self.enabled {
            return Ok(());
        }
        if self.keys.is_empty() {
            return Err(ApiError::Internal(
                "Authentication is enabled but no API keys are configured".to_string(),
            ));
        }
        let Some(presented) = presented.filter(|k| !k.is_empty()) else {
            return Err(ApiError::Unauthorized("API key is required".to_string()));
        };

        // Every key is compared so timing does not reveal which one matched.
        let matched = self
            .keys
            .iter()
            .fold(Choice::from(0), |acc, key| acc | key.as_bytes().ct_eq(presented.as_bytes()));
        if bool::from(matched) {
            Ok(())
        } else {
            Err(ApiError::Unauthorized("Invalid API key".to_string()))
        }
    }
}

/// Key from a non-empty `X-API-Key`, else from `Authorization: Bearer`
fn presented_key(request: &Request) -> Option<&str> {
    let headers = request.headers();
    let api_key = headers
        .get(API_KEY_HEADER)
        .and_then(|v| v.to_str().ok())
        .map(str::trim)
        .filter(|k| !k.is_empty());
    if api_key.is_some() {
        return api_key;
    }
    headers
        .get(header::AUTHORIZATION)
        .and_then(|v| v.to_str().ok())
        .and_then(|v| v.strip_prefix("Bearer "))
        .map(str::trim)
        .filter(|k| !k.is_empty())
}

/// Reject requests without a valid API key
pub async fn require_api_key(
    State(auth): State<Arc<ApiKeyAuth>>,
    request: Request,
    next: Next,
) -> Response {
    if let Err(e) = auth.authorize(presented_key(&request)) {
        warn!(path = %request.uri().path(), error = %e, "request rejected by api key check");
        return e.into_response();
    }
    next.run(request).await
}

/// Headers added to every response
pub fn security_headers() -> [(HeaderName, HeaderValue); 5] {
    [
        (
            header::X_CONTENT_TYPE_OPTIONS,
            HeaderValue::from_static("nosniff"),
        ),
        (header::X_FRAME_OPTIONS, HeaderValue::from_static("DENY")),
        (
            header::X_XSS_PROTECTION,
            HeaderValue::from_static("1; mode=block"),
        ),
        (
            header::REFERRER_POLICY,
            HeaderValue::from_static("strict-origin-when-cross-origin"),
        ),
        (
            header::CONTENT_SECURITY_POLICY,
            HeaderValue::from_static("default-src 'self'"),
        ),
    ]
}

/// Generates a UUID v4 request id when the client sent none
#[derive(Debug, Clone, Copy, Default)]
pub struct MakeUuidRequestId;

impl MakeRequestId for MakeUuidRequestId {
    fn make_request_id<B>(&mut self, _request: &axum::http::Request<B>) -> Option<RequestId> {
        HeaderValue::from_str(&Uuid::new_v4().to_string())
            .ok()
            .map(RequestId::new)
    }
}
