//! # apx-api — Asset Proxy HTTP Service
//!
//! Serves game-data assets from an origin server through a local cache.
//! The first request for an asset downloads and persists it; later requests
//! are served from disk without contacting the origin.
//!
//! ## API Surface
//!
//! | Route                | Module                 | Purpose                         |
//! |----------------------|------------------------|---------------------------------|
//! | `GET /fetch?url=`    | [`routes::fetch`]      | Fetch-and-cache an asset        |
//! | `GET /metrics`       | [`routes::metrics`]    | Request and cache counters      |
//! | `GET /openapi.json`  | [`openapi`]            | OpenAPI document                |
//! | `GET /health/*`      | this module            | Liveness and readiness probes   |
//!
//! ## Request Flow
//!
//! ```text
//! validate url → cache hit? ──yes──────────────────────────→ stream attachment
//!                    └─no─→ claim identity → retrieve → commit ─┘
//! ```
//!
//! ## Middleware Stack (execution order)
//!
//! ```text
//! TraceLayer → MetricsMiddleware → Handler
//! ```

pub mod bootstrap;
pub mod error;
pub mod middleware;
pub mod openapi;
pub mod routes;
pub mod state;
pub mod streamer;

use axum::extract::State;
use axum::http::StatusCode;
use axum::middleware::from_fn;
use axum::routing::get;
use axum::Router;

pub use error::AppError;
pub use state::{AppConfig, AppState};

/// Assemble the application router with all routes and middleware.
///
/// Health probes are mounted outside the metrics middleware so polling
/// does not skew request counters.
pub fn app(state: AppState) -> Router {
    let metrics = state.metrics.clone();

    let api = Router::new()
        .merge(routes::fetch::router())
        .merge(routes::metrics::router())
        .merge(openapi::router())
        .layer(from_fn(middleware::metrics::metrics_middleware))
        .layer(middleware::tracing_layer::layer())
        .layer(axum::Extension(metrics))
        .with_state(state.clone());

    let health = Router::new()
        .route("/health/liveness", get(liveness))
        .route("/health/readiness", get(readiness))
        .with_state(state);

    Router::new().merge(health).merge(api)
}

/// Liveness probe: 200 while the process is running.
async fn liveness() -> &'static str {
    "ok"
}

/// Readiness probe: 200 while the cache directory is reachable.
async fn readiness(State(state): State<AppState>) -> (StatusCode, &'static str) {
    if state.store.is_accessible().await {
        (StatusCode::OK, "ready")
    } else {
        (StatusCode::SERVICE_UNAVAILABLE, "cache directory unavailable")
    }
}
