//! Health and API documentation routes

use axum::{extract::State, http::StatusCode, response::IntoResponse, routing::get, Json, Router};
use serde::Serialize;
use serde_json::{json, Value};
use tracing::warn;

use crate::zone::RecordStore;

pub const SERVICE_NAME: &str = "hyprknot";

/// Health check response
#[derive(Debug, Serialize)]
pub struct HealthResponse {
    pub status: &'static str,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub service: Option<&'static str>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub version: Option<&'static str>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<&'static str>,
}

impl HealthResponse {
    fn healthy() -> Self {
        Self {
            status: "healthy",
            service: Some(SERVICE_NAME),
            version: Some(env!("CARGO_PKG_VERSION")),
            error: None,
        }
    }

    fn unhealthy() -> Self {
        Self {
            status: "unhealthy",
            service: None,
            version: None,
            error: Some("KnotDNS is not accessible"),
        }
    }
}

/// Health check route, served without authentication
pub fn health_routes(store: RecordStore) -> Router {
    Router::new()
        .route("/health", get(health_handler))
        .with_state(store)
}

/// Endpoint catalogue, mounted under `/api/v1`
pub fn docs_routes() -> Router {
    Router::new().route("/docs", get(docs_handler))
}

async fn health_handler(State(store): State<RecordStore>) -> impl IntoResponse {
    match store.health().await {
        Ok(()) => (StatusCode::OK, Json(HealthResponse::healthy())),
        Err(e) => {
            warn!(error = %e, "health check failed");
            (StatusCode::SERVICE_UNAVAILABLE, Json(HealthResponse::unhealthy()))
        }
    }
}

fn endpoint(method: &str, path: &str, desc: &str) -> Value {
    json!({ "method": method, "path": path, "desc": desc })
}

async fn docs_handler() -> Json<Value> {
    const RECORD: &str = "/api/v1/zones/{zone}/records/{name}/{type}";
    const RECORDS: &str = "/api/v1/zones/{zone}/records";

    Json(json!({
        "service": SERVICE_NAME,
        "version": env!("CARGO_PKG_VERSION"),
        "endpoints": {
            "health": endpoint("GET", "/health", "Health check endpoint"),
            "zones": {
                "list": endpoint("GET", "/api/v1/zones", "List all zones"),
                "reload": endpoint("POST", "/api/v1/zones/{zone}/reload", "Reload a zone"),
            },
            "records": {
                "list": endpoint("GET", RECORDS, "List all records in a zone"),
                "get": endpoint("GET", RECORD, "Get a specific record"),
                "create": endpoint("POST", RECORDS, "Create a new record"),
                "update": endpoint("PUT", RECORD, "Update an existing record"),
                "delete": endpoint("DELETE", RECORD, "Delete a record"),
            },
        },
        "record_types": crate::zone::RecordType::ALL
            .iter()
            .map(|t| t.as_str())
            .collect::<Vec<_>>(),
    }))
}
