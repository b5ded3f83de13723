//! # API Error Types
//!
//! Structured error type implementing `axum::response::IntoResponse`.
//! Maps request, retrieval, and storage errors from the lower crates to HTTP
//! status codes with a JSON body carrying a machine-readable code.
//! Error responses carry `Access-Control-Allow-Origin: *` so browser callers
//! can read them.

use std::sync::Arc;

use apx_core::RequestError;
use apx_fetch::FetchError;
use apx_store::StoreError;
use axum::extract::rejection::QueryRejection;
use axum::http::header::ACCESS_CONTROL_ALLOW_ORIGIN;
use axum::http::{HeaderValue, StatusCode};
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use utoipa::ToSchema;

/// Structured JSON error response body.
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct ErrorBody {
    pub error: ErrorDetail,
}

/// Inner error detail.
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct ErrorDetail {
    /// Machine-readable error code (e.g., "MISSING_PARAMETER", "RETRIEVAL_EXHAUSTED").
    pub code: String,
    /// Human-readable error message.
    pub message: String,
}

/// Application-level error type that implements [`IntoResponse`] for Axum.
#[derive(Error, Debug)]
pub enum AppError {
    /// The query string could not be decoded (400).
    #[error("invalid query string: {0}")]
    Query(String),

    /// The `url` parameter was rejected before any I/O (400 or 403).
    #[error(transparent)]
    Request(#[from] RequestError),

    /// Retrieval from the origin failed (500). Shared between every request
    /// waiting on the same download.
    #[error(transparent)]
    Fetch(Arc<FetchError>),

    /// A cached asset could not be opened for streaming (500).
    #[error("error serving file: {0}")]
    Serve(#[source] StoreError),

    /// Internal server error (500). Message is logged but not returned to client.
    #[error("internal error: {0}")]
    Internal(String),
}

impl AppError {
    /// Return the HTTP status code and machine-readable error code for this error.
    fn status_and_code(&self) -> (StatusCode, &'static str) {
        match self {
            Self::Query(_) => (StatusCode::BAD_REQUEST, "INVALID_QUERY"),
            Self::Request(RequestError::MissingParameter) => {
                (StatusCode::BAD_REQUEST, "MISSING_PARAMETER")
            }
            Self::Request(RequestError::InvalidUrl { .. }) => {
                (StatusCode::BAD_REQUEST, "INVALID_URL")
            }
            Self::Request(RequestError::UnresolvableFilename { .. }) => {
                (StatusCode::BAD_REQUEST, "UNRESOLVABLE_FILENAME")
            }
            Self::Request(RequestError::HostNotAllowed { .. }) => {
                (StatusCode::FORBIDDEN, "HOST_NOT_ALLOWED")
            }
            Self::Fetch(err) => match err.as_ref() {
                FetchError::RetrievalExhausted { .. } => {
                    (StatusCode::INTERNAL_SERVER_ERROR, "RETRIEVAL_EXHAUSTED")
                }
                FetchError::Store(_) => (StatusCode::INTERNAL_SERVER_ERROR, "CACHE_WRITE_FAILED"),
                FetchError::Client(_) => (StatusCode::INTERNAL_SERVER_ERROR, "INTERNAL_ERROR"),
            },
            Self::Serve(_) => (StatusCode::INTERNAL_SERVER_ERROR, "SERVE_FAILURE"),
            Self::Internal(_) => (StatusCode::INTERNAL_SERVER_ERROR, "INTERNAL_ERROR"),
        }
    }
}

impl From<QueryRejection> for AppError {
    fn from(rejection: QueryRejection) -> Self {
        Self::Query(rejection.body_text())
    }
}

impl From<Arc<FetchError>> for AppError {
    fn from(err: Arc<FetchError>) -> Self {
        Self::Fetch(err)
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, code) = self.status_and_code();

        // Never expose internal error messages to clients.
        let message = if code == "INTERNAL_ERROR" {
            "An internal error occurred".to_string()
        } else {
            self.to_string()
        };

        if status.is_server_error() {
            tracing::error!(error = %self, code, "request failed");
        } else {
            tracing::debug!(error = %self, code, "request rejected");
        }

        let body = ErrorBody {
            error: ErrorDetail {
                code: code.to_string(),
                message,
            },
        };

        let mut response = (status, Json(body)).into_response();
        response
            .headers_mut()
            .insert(ACCESS_CONTROL_ALLOW_ORIGIN, HeaderValue::from_static("*"));
        response
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use apx_core::AssetId;
    use apx_fetch::AttemptError;

    fn io_error() -> std::io::Error {
        std::io::Error::from(std::io::ErrorKind::NotFound)
    }

    #[test]
    fn missing_parameter_status_code() {
        let (status, code) = AppError::from(RequestError::MissingParameter).status_and_code();
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(code, "MISSING_PARAMETER");
    }

    #[test]
    fn query_rejection_status_code() {
        let (status, code) = AppError::Query("duplicate field `url`".into()).status_and_code();
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(code, "INVALID_QUERY");
    }

    #[test]
    fn unresolvable_filename_status_code() {
        let err = AppError::from(RequestError::UnresolvableFilename {
            url: "https://cdn.example/dir/".into(),
        });
        let (status, code) = err.status_and_code();
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(code, "UNRESOLVABLE_FILENAME");
    }

    #[test]
    fn host_not_allowed_status_code() {
        let err = AppError::from(RequestError::HostNotAllowed {
            host: "evil.example".into(),
        });
        let (status, code) = err.status_and_code();
        assert_eq!(status, StatusCode::FORBIDDEN);
        assert_eq!(code, "HOST_NOT_ALLOWED");
    }

    #[test]
    fn exhaustion_keeps_attempt_count_in_message() {
        let err = AppError::from(Arc::new(FetchError::RetrievalExhausted {
            attempts: 3,
            last: AttemptError::Status { status: 503 },
        }));
        let (status, code) = err.status_and_code();
        assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(code, "RETRIEVAL_EXHAUSTED");
        assert!(err.to_string().contains("failed after 3 attempts"));
    }

    #[test]
    fn cache_write_failure_status_code() {
        let err = AppError::from(Arc::new(FetchError::Store(StoreError::Stage {
            id: AssetId::new("a.bin").unwrap(),
            source: io_error(),
        })));
        assert_eq!(err.status_and_code().1, "CACHE_WRITE_FAILED");
    }

    #[test]
    fn serve_failure_names_cause() {
        let err = AppError::Serve(StoreError::Open {
            id: AssetId::new("gone.bin").unwrap(),
            source: io_error(),
        });
        assert_eq!(err.status_and_code().1, "SERVE_FAILURE");
        assert!(err.to_string().starts_with("error serving file:"));
    }

    #[test]
    fn error_response_allows_any_origin() {
        let response = AppError::from(RequestError::MissingParameter).into_response();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        assert_eq!(
            response.headers().get(ACCESS_CONTROL_ALLOW_ORIGIN).unwrap(),
            "*"
        );
    }

    #[test]
    fn internal_error_hides_message() {
        let response = AppError::Internal("secret detail".into()).into_response();
        assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
    }

    #[test]
    fn error_body_serialization() {
        let body = ErrorBody {
            error: ErrorDetail {
                code: "INVALID_URL".to_string(),
                message: "invalid url".to_string(),
            },
        };
        let json = serde_json::to_value(&body).unwrap();
        assert_eq!(json["error"]["code"], "INVALID_URL");
        assert_eq!(json["error"]["message"], "invalid url");
    }
}
