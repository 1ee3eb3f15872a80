//! # HTTP Server Module
//!
//! JSON API over the record store.
//!
//! # Endpoints
//!
//! - `/health` - Control plane reachability, no authentication
//! - `/api/v1/zones` - Zone listing and reload
//! - `/api/v1/zones/:zone/records` - Record CRUD
//! - `/api/v1/docs` - Endpoint catalogue

pub mod config;
pub mod errors;
pub mod middleware;
pub mod observability_routes;
pub mod rate_limiter;
pub mod server;
pub mod zone_routes;

pub use config::HttpServerConfig;
pub use errors::{ApiError, ApiResult, ErrorResponse};
pub use middleware::ApiKeyAuth;
pub use rate_limiter::RateLimiter;
pub use server::{HttpServer, ServerState};
