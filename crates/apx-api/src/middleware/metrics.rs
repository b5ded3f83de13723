//! # Request Metrics
//!
//! Lightweight in-process counters using atomics. The middleware counts
//! requests and error responses; the fetch handler records cache hits,
//! misses, and origin download outcomes.

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

use axum::extract::Request;
use axum::middleware::Next;
use axum::response::Response;
use serde::Serialize;
use utoipa::ToSchema;

#[derive(Debug, Default)]
struct Counters {
    requests: AtomicU64,
    errors: AtomicU64,
    cache_hits: AtomicU64,
    cache_misses: AtomicU64,
    downloads: AtomicU64,
    download_failures: AtomicU64,
}

/// Shared metrics state.
#[derive(Debug, Clone, Default)]
pub struct ApiMetrics {
    counters: Arc<Counters>,
}

/// Point-in-time copy of every counter.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, ToSchema)]
pub struct MetricsSnapshot {
    /// Requests that passed through the API router.
    pub requests: u64,
    /// Responses with a 4xx or 5xx status.
    pub errors: u64,
    /// Fetches answered from the cache without contacting the origin.
    pub cache_hits: u64,
    /// Fetches for an identity that was not cached on arrival.
    pub cache_misses: u64,
    /// Completed origin downloads.
    pub downloads: u64,
    /// Origin retrievals that failed after exhausting their attempts.
    pub download_failures: u64,
}

impl ApiMetrics {
    /// Create a new metrics instance.
    pub fn new() -> Self {
        Self::default()
    }

    /// Return current request count.
    pub fn requests(&self) -> u64 {
        self.counters.requests.load(Ordering::Relaxed)
    }

    /// Return current error count.
    pub fn errors(&self) -> u64 {
        self.counters.errors.load(Ordering::Relaxed)
    }

    pub fn record_hit(&self) {
        self.counters.cache_hits.fetch_add(1, Ordering::Relaxed);
    }

    pub fn record_miss(&self) {
        self.counters.cache_misses.fetch_add(1, Ordering::Relaxed);
    }

    pub fn record_download(&self) {
        self.counters.downloads.fetch_add(1, Ordering::Relaxed);
    }

    pub fn record_download_failure(&self) {
        self.counters.download_failures.fetch_add(1, Ordering::Relaxed);
    }

    /// Read every counter.
    pub fn snapshot(&self) -> MetricsSnapshot {
        let c = &self.counters;
        MetricsSnapshot {
            requests: c.requests.load(Ordering::Relaxed),
            errors: c.errors.load(Ordering::Relaxed),
            cache_hits: c.cache_hits.load(Ordering::Relaxed),
            cache_misses: c.cache_misses.load(Ordering::Relaxed),
            downloads: c.downloads.load(Ordering::Relaxed),
            download_failures: c.download_failures.load(Ordering::Relaxed),
        }
    }
}

/// Middleware that increments request and error counters.
pub async fn metrics_middleware(request: Request, next: Next) -> Response {
    let metrics = request.extensions().get::<ApiMetrics>().cloned();

    let response = next.run(request).await;

    if let Some(m) = metrics {
        m.counters.requests.fetch_add(1, Ordering::Relaxed);
        if response.status().is_server_error() || response.status().is_client_error() {
            m.counters.errors.fetch_add(1, Ordering::Relaxed);
        }
    }

    response
}
