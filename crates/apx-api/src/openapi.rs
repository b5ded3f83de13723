//! # OpenAPI Document
//!
//! Assembles the utoipa-documented routes into one OpenAPI 3.1 document,
//! served at `/openapi.json`.

use axum::routing::get;
use axum::{Json, Router};
use utoipa::OpenApi;

use crate::state::AppState;

/// Assembled OpenAPI document for the entire API surface.
#[derive(OpenApi)]
#[openapi(
    info(
        title = "APX Asset Proxy",
        version = "0.1.0",
        description = "Fetch-and-cache proxy for game-data assets. Each asset is downloaded from its origin once and served from the local cache afterwards.",
        license(name = "AGPL-3.0-or-later")
    ),
    paths(
        crate::routes::fetch::fetch_asset,
        crate::routes::metrics::metrics,
    ),
    components(schemas(
        crate::error::ErrorBody,
        crate::error::ErrorDetail,
        crate::middleware::metrics::MetricsSnapshot,
    )),
    tags(
        (name = "assets", description = "Cached asset retrieval"),
        (name = "operations", description = "Service counters"),
    )
)]
pub struct ApiDoc;

/// Build the OpenAPI router.
pub fn router() -> Router<AppState> {
    Router::new().route("/openapi.json", get(openapi_json))
}

/// GET /openapi.json: the generated OpenAPI document.
async fn openapi_json() -> Json<utoipa::openapi::OpenApi> {
    Json(ApiDoc::openapi())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn document_lists_fetch_and_metrics() {
        let doc = ApiDoc::openapi();
        assert!(doc.paths.paths.contains_key("/fetch"));
        assert!(doc.paths.paths.contains_key("/metrics"));
    }

    #[test]
    fn document_serializes_to_json() {
        let json = serde_json::to_string(&ApiDoc::openapi()).unwrap();
        assert!(json.contains("APX Asset Proxy"));
        assert!(json.contains("ErrorBody"));
    }
}
