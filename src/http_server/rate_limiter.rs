//! Per-client request limiting
//!
//! Sliding window per client IP. Requests whose peer address is unknown
//! share one bucket. The limiter is owned by the router state rather than
//! living in a global.

use std::collections::{HashMap, VecDeque};
use std::net::{IpAddr, SocketAddr};
use std::sync::{Arc, Mutex};
use std::time::{Duration, Instant};

use axum::extract::{ConnectInfo, Request, State};
use axum::middleware::Next;
use axum::response::{IntoResponse, Response};
use tracing::warn;

use super::errors::ApiError;
use crate::config::RateLimitConfig;

#[derive(Debug, Default)]
struct Buckets {
    hits: HashMap<Option<IpAddr>, VecDeque<Instant>>,
    last_sweep: Option<Instant>,
}

/// Sliding-window limiter keyed by client IP
#[derive(Debug)]
pub struct RateLimiter {
    max_requests: usize,
    window: Duration,
    buckets: Mutex<Buckets>,
}

impl RateLimiter {
    pub fn new(max_requests: usize, window: Duration) -> Self {
        Self {
            max_requests,
            window,
            buckets: Mutex::new(Buckets::default()),
        }
    }

    /// Build from configuration; `None` when limiting is disabled
    pub fn from_config(config: &RateLimitConfig) -> Option<Arc<Self>> {
        config
            .enabled
            .then(|| Arc::new(Self::new(config.max_requests, config.window())))
    }

    /// Record a request from `client` and report whether it is within budget
    pub fn check(&self, client: Option<IpAddr>) -> bool {
        self.check_at(client, Instant::now())
    }

    fn check_at(&self, client: Option<IpAddr>, now: Instant) -> bool {
        let mut buckets = self.buckets.lock().unwrap_or_else(|p| p.into_inner());

        let due = buckets
            .last_sweep
            .map_or(true, |t| now.saturating_duration_since(t) >= self.window);
        if due {
            let window = self.window;
            buckets.hits.retain(|_, hits| {
                hits.back()
                    .is_some_and(|t| now.saturating_duration_since(*t) < window)
            });
            buckets.last_sweep = Some(now);
        }

        let hits = buckets.hits.entry(client).or_default();
        while hits
            .front()
            .is_some_and(|t| now.saturating_duration_since(*t) >= self.window)
        {
            hits.pop_front();
        }
        if hits.len() >= self.max_requests {
            return false;
        }
        hits.push_back(now);
        true
    }

    /// Number of clients currently tracked
    pub fn tracked_clients(&self) -> usize {
        self.buckets.lock().unwrap_or_else(|p| p.into_inner()).hits.len()
    }
}

/// Reject requests beyond the client's budget with 429
pub async fn limit_requests(
    State(limiter): State<Arc<RateLimiter>>,
    request: Request,
    next: Next,
) -> Response {
    let client = request
        .extensions()
        .get::<ConnectInfo<SocketAddr>>()
        .map(|ConnectInfo(addr)| addr.ip());

    if !limiter.check(client) {
        warn!(client = ?client, path = %request.uri().path(), "rate limit exceeded");
        return ApiError::RateLimited.into_response();
    }
    next.run(request).await
}
