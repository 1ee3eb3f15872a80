//! # HTTP Server
//!
//! Combines the health, docs and zone routers with the middleware stack
//! and runs them until SIGINT or SIGTERM.

use std::any::Any;
use std::future::IntoFuture;
use std::net::SocketAddr;
use std::sync::Arc;

use axum::http::Method;
use axum::middleware;
use axum::response::{IntoResponse, Response};
use axum::Router;
use tokio::net::TcpListener;
use tokio::sync::watch;
use tower_http::catch_panic::CatchPanicLayer;
use tower_http::cors::{AllowOrigin, Any as CorsAny, CorsLayer};
use tower_http::request_id::{PropagateRequestIdLayer, SetRequestIdLayer};
use tower_http::set_header::SetResponseHeaderLayer;
use tower_http::timeout::TimeoutLayer;
use tower_http::trace::TraceLayer;
use tracing::{error, info, warn};

use super::config::HttpServerConfig;
use super::errors::ApiError;
use super::middleware::{require_api_key, security_headers, ApiKeyAuth, MakeUuidRequestId};
use super::observability_routes::{docs_routes, health_routes};
use super::rate_limiter::{limit_requests, RateLimiter};
use super::zone_routes::zone_routes;
use crate::zone::RecordStore;

/// Everything the routers and middleware share
#[derive(Clone)]
pub struct ServerState {
    pub store: RecordStore,
    pub auth: ApiKeyAuth,
    pub rate_limiter: Option<Arc<RateLimiter>>,
}

/// HTTP Server for the record API
pub struct HttpServer {
    config: HttpServerConfig,
    router: Router,
}

impl HttpServer {
    pub fn new(config: HttpServerConfig, state: ServerState) -> Self {
        let router = Self::build_router(&config, state);
        Self { config, router }
    }

    /// Build the combined router. Layers are listed innermost first.
    fn build_router(config: &HttpServerConfig, state: ServerState) -> Router {
        let api = Router::new()
            .merge(zone_routes(state.store.clone()))
            .merge(docs_routes())
            .layer(middleware::from_fn_with_state(
                Arc::new(state.auth),
                require_api_key,
            ));

        let mut router = Router::new()
            .merge(health_routes(state.store))
            .nest("/api/v1", api);

        if let Some(limiter) = state.rate_limiter {
            router = router.layer(middleware::from_fn_with_state(limiter, limit_requests));
        }

        router = router
            .layer(PropagateRequestIdLayer::x_request_id())
            .layer(SetRequestIdLayer::x_request_id(MakeUuidRequestId))
            .layer(cors_layer(config));

        for (name, value) in security_headers() {
            router = router.layer(SetResponseHeaderLayer::overriding(name, value));
        }

        router
            .layer(TimeoutLayer::new(config.request_timeout()))
            .layer(TraceLayer::new_for_http())
            .layer(CatchPanicLayer::custom(panic_response))
    }

    /// Get the socket address
    pub fn socket_addr(&self) -> String {
        self.config.socket_addr()
    }

    /// Get the router (for testing)
    pub fn router(self) -> Router {
        self.router
    }

    /// Serve until a shutdown signal, then drain in-flight requests for at
    /// most the configured grace period.
    pub async fn start(self) -> Result<(), std::io::Error> {
        let addr = self.config.socket_addr();
        let listener = TcpListener::bind(&addr).await?;
        info!(addr = %addr, "HTTP server listening");

        let (shutdown_tx, mut shutdown_rx) = watch::channel(false);
        let serve = axum::serve(
            listener,
            self.router
                .into_make_service_with_connect_info::<SocketAddr>(),
        )
        .with_graceful_shutdown(async move {
            shutdown_signal().await;
            let _ = shutdown_tx.send(true);
        })
        .into_future();
        tokio::pin!(serve);

        tokio::select! {
            biased;
            result = &mut serve => return result,
            _ = shutdown_rx.changed() => {}
        }

        let grace = self.config.shutdown_grace();
        info!(grace_secs = grace.as_secs(), "shutdown signal received, draining requests");
        match tokio::time::timeout(grace, serve).await {
            Ok(result) => result,
            Err(_) => {
                warn!("grace period elapsed with requests still in flight");
                Ok(())
            }
        }
    }
}

fn cors_layer(config: &HttpServerConfig) -> CorsLayer {
    let methods = [
        Method::GET,
        Method::POST,
        Method::PUT,
        Method::DELETE,
        Method::OPTIONS,
    ];
    let cors = CorsLayer::new()
        .allow_methods(methods)
        .allow_headers(CorsAny);

    if config.cors_origins.is_empty() {
        cors.allow_origin(CorsAny)
    } else {
        let origins: Vec<_> = config
            .cors_origins
            .iter()
            .filter_map(|s| s.parse().ok())
            .collect();
        cors.allow_origin(AllowOrigin::list(origins))
    }
}

fn panic_response(panic: Box<dyn Any + Send + 'static>) -> Response {
    let detail = panic
        .downcast_ref::<String>()
        .map(String::as_str)
        .or_else(|| panic.downcast_ref::<&str>().copied())
        .unwrap_or("unknown panic");
    error!(panic = detail, "handler panicked");
    ApiError::Internal("Internal server error".to_string()).into_response()
}

async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            error!(error = %e, "failed to listen for ctrl-c");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        use tokio::signal::unix::{signal, SignalKind};
        match signal(SignalKind::terminate()) {
            Ok(mut sigterm) => {
                sigterm.recv().await;
            }
            Err(e) => {
                error!(error = %e, "failed to listen for SIGTERM");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }
}
