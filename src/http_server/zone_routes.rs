//! Zone and Record HTTP Routes
//!
//! Endpoints under `/api/v1` for listing zones, reloading them and CRUD on
//! their records.

use axum::{
    extract::{rejection::JsonRejection, Path, State},
    http::StatusCode,
    routing::{get, post},
    Json, Router,
};
use serde::Serialize;

use super::errors::{ApiError, ApiResult};
use crate::zone::{CreateOutcome, Record, RecordStore, RecordType, UpdateDelta};

// ==================
// Response Types
// ==================

#[derive(Debug, Serialize)]
pub struct ZonesResponse {
    pub zones: Vec<String>,
}

#[derive(Debug, Serialize)]
pub struct RecordsResponse {
    pub zone: String,
    pub records: Vec<Record>,
}

#[derive(Debug, Serialize)]
pub struct MessageResponse {
    pub message: String,
}

// ==================
// Zone Routes
// ==================

/// Create zone and record routes
pub fn zone_routes(store: RecordStore) -> Router {
    Router::new()
        .route("/zones", get(list_zones_handler))
        .route("/zones/:zone/reload", post(reload_zone_handler))
        .route(
            "/zones/:zone/records",
            get(list_records_handler).post(create_record_handler),
        )
        .route(
            "/zones/:zone/records/:name/:record_type",
            get(get_record_handler)
                .put(update_record_handler)
                .delete(delete_record_handler),
        )
        .with_state(store)
}

fn parse_type(raw: &str) -> ApiResult<RecordType> {
    raw.parse()
        .map_err(|_| ApiError::BadRequest(format!("Invalid record type: {}", raw)))
}

// ==================
// Zone Handlers
// ==================

async fn list_zones_handler(State(store): State<RecordStore>) -> ApiResult<Json<ZonesResponse>> {
    let zones = store.list_zones().await?;
    Ok(Json(ZonesResponse { zones }))
}

async fn reload_zone_handler(
    State(store): State<RecordStore>,
    Path(zone): Path<String>,
) -> ApiResult<Json<MessageResponse>> {
    store.reload_zone(&zone).await?;
    Ok(Json(MessageResponse {
        message: "Zone reloaded successfully".to_string(),
    }))
}

// ==================
// Record Handlers
// ==================

async fn list_records_handler(
    State(store): State<RecordStore>,
    Path(zone): Path<String>,
) -> ApiResult<Json<RecordsResponse>> {
    let records = store.list_records(&zone).await?;
    Ok(Json(RecordsResponse { zone, records }))
}

async fn get_record_handler(
    State(store): State<RecordStore>,
    Path((zone, name, record_type)): Path<(String, String, String)>,
) -> ApiResult<Json<Record>> {
    let record_type = parse_type(&record_type)?;
    let record = store.get_record(&zone, &name, record_type).await?;
    Ok(Json(record))
}

async fn create_record_handler(
    State(store): State<RecordStore>,
    Path(zone): Path<String>,
    body: Result<Json<Record>, JsonRejection>,
) -> ApiResult<(StatusCode, Json<Record>)> {
    let Json(record) = body?;
    let (status, record) = match store.create_record(&zone, record).await? {
        CreateOutcome::Unchanged(record) => (StatusCode::OK, record),
        CreateOutcome::Created(record) | CreateOutcome::Replaced(record) => {
            (StatusCode::CREATED, record)
        }
    };
    Ok((status, Json(record)))
}

async fn update_record_handler(
    State(store): State<RecordStore>,
    Path((zone, name, record_type)): Path<(String, String, String)>,
    body: Result<Json<UpdateDelta>, JsonRejection>,
) -> ApiResult<Json<Record>> {
    let record_type = parse_type(&record_type)?;
    let Json(delta) = body?;
    let updated = store.update_record(&zone, &name, record_type, &delta).await?;
    Ok(Json(updated))
}

async fn delete_record_handler(
    State(store): State<RecordStore>,
    Path((zone, name, record_type)): Path<(String, String, String)>,
) -> ApiResult<Json<MessageResponse>> {
    let record_type = parse_type(&record_type)?;
    store.delete_record(&zone, &name, record_type).await?;
    Ok(Json(MessageResponse {
        message: "Record deleted successfully".to_string(),
    }))
}
