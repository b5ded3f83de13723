//! `GET /metrics`: in-process request and cache counters as JSON.

use axum::extract::State;
use axum::routing::get;
use axum::{Json, Router};

use crate::middleware::metrics::MetricsSnapshot;
use crate::state::AppState;

pub fn router() -> Router<AppState> {
    Router::new().route("/metrics", get(metrics))
}

/// GET /metrics: current counter values.
#[utoipa::path(
    get,
    path = "/metrics",
    responses(
        (status = 200, description = "Counter snapshot", body = MetricsSnapshot),
    ),
    tag = "operations"
)]
pub async fn metrics(State(state): State<AppState>) -> Json<MetricsSnapshot> {
    Json(state.metrics.snapshot())
}
