//! # Fetch Route
//!
//! `GET /fetch?url=<absolute source URL>` returns the asset named by the
//! final path segment of `url`, downloading it from the origin first when it
//! is not yet cached.
//!
//! ## Request States
//!
//! ```text
//! Received → Validated → {CacheHit | Downloading → Persisted} → Streaming
//! ```
//!
//! Validation failures are answered before any network or disk I/O.
//! Concurrent misses for the same identity share one download through the
//! single-flight claim table in [`AppState`].

use std::sync::Arc;

use apx_core::FetchRequest;
use axum::extract::rejection::QueryRejection;
use axum::extract::{Query, State};
use axum::response::Response;
use axum::routing::get;
use axum::Router;
use serde::Deserialize;
use utoipa::IntoParams;

use crate::error::AppError;
use crate::state::{AppState, Population};
use crate::streamer;

/// Query parameters for `GET /fetch`.
#[derive(Debug, Deserialize, IntoParams)]
#[into_params(parameter_in = Query)]
pub struct FetchParams {
    /// Absolute `http`/`https` URL of the asset on its origin.
    pub url: Option<String>,
}

pub fn router() -> Router<AppState> {
    Router::new().route("/fetch", get(fetch_asset))
}

/// GET /fetch: fetch an asset through the cache.
#[utoipa::path(
    get,
    path = "/fetch",
    params(FetchParams),
    responses(
        (status = 200, description = "Asset bytes as an attachment", content_type = "application/octet-stream", body = Vec<u8>),
        (status = 400, description = "Missing or invalid url, undecodable query, or no filename derivable", body = crate::error::ErrorBody),
        (status = 403, description = "Origin host not allowed", body = crate::error::ErrorBody),
        (status = 500, description = "Retrieval exhausted, cache write failed, or serve failure", body = crate::error::ErrorBody),
    ),
    tag = "assets"
)]
pub async fn fetch_asset(
    State(state): State<AppState>,
    params: Result<Query<FetchParams>, QueryRejection>,
) -> Result<Response, AppError> {
    let Query(params) = params?;
    let request = FetchRequest::parse(params.url.as_deref())?;
    state.config.host_policy.check(&request)?;
    let id = request.asset_id.clone();

    if state.store.exists(&id).await {
        state.metrics.record_hit();
        tracing::debug!(asset = %id, "cache hit");
    } else {
        state.metrics.record_miss();
        populate(&state, request).await?;
    }

    streamer::attachment(&state.store, &id, state.config.fetch.chunk_size).await
}

/// Make sure the requested identity is cached, downloading it at most once
/// no matter how many requests are waiting on it.
async fn populate(state: &AppState, request: FetchRequest) -> Result<(), AppError> {
    let store = state.store.clone();
    let retriever = state.retriever.clone();
    let metrics = state.metrics.clone();
    let key = request.asset_id.clone();

    let (outcome, role) = state
        .inflight
        .run(key.clone(), move || async move {
            let FetchRequest { source, asset_id } = request;
            // Committed by a claim that finished after our presence check.
            if store.exists(&asset_id).await {
                return Ok(Population::AlreadyCached);
            }
            match retriever.retrieve(&source, &store, &asset_id).await {
                Ok(retrieved) => {
                    metrics.record_download();
                    Ok(Population::Downloaded(retrieved))
                }
                Err(e) => {
                    metrics.record_download_failure();
                    tracing::error!(asset = %asset_id, url = %source, error = %e, "retrieval failed");
                    Err(Arc::new(e))
                }
            }
        })
        .await
        .map_err(|e| AppError::Internal(e.to_string()))?;

    tracing::debug!(asset = %key, ?role, ?outcome, "cache population resolved");
    outcome.map(|_| ()).map_err(AppError::from)
}
