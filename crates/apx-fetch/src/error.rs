//! Retrieval error types.

use std::time::Duration;

use apx_store::StoreError;

use crate::retry::Retryable;

/// Why a single download attempt failed.
#[derive(Debug, thiserror::Error)]
pub enum AttemptError {
    /// Connection, TLS, or body-stream failure.
    #[error("request to {url} failed: {source}")]
    Transport {
        url: String,
        source: reqwest::Error,
    },

    /// The origin answered with a non-success status.
    #[error("origin returned HTTP {status}")]
    Status { status: u16 },

    /// No progress within the per-attempt timeout.
    #[error("timed out after {}s waiting for {stage}", after.as_secs_f32())]
    Timeout {
        stage: &'static str,
        after: Duration,
    },

    /// The body ended before the advertised `Content-Length`.
    #[error("body ended after {received} of {expected} bytes")]
    Truncated { expected: u64, received: u64 },

    /// Local storage failure while staging or committing the asset.
    #[error(transparent)]
    Store(#[from] StoreError),
}

impl Retryable for AttemptError {
    fn is_retryable(&self) -> bool {
        !matches!(self, Self::Store(_))
    }
}

/// Errors from [`Retriever::retrieve`](crate::Retriever::retrieve).
#[derive(Debug, thiserror::Error)]
pub enum FetchError {
    /// Every attempt failed with a network-layer error.
    #[error("failed after {attempts} attempts: {last}")]
    RetrievalExhausted { attempts: u32, last: AttemptError },

    /// The asset could not be written to the cache store.
    #[error("cache write failed: {0}")]
    Store(#[source] StoreError),

    /// The HTTP client could not be constructed.
    #[error("failed to build HTTP client: {0}")]
    Client(#[source] reqwest::Error),
}

impl FetchError {
    /// Number of attempts made, when retrieval reached the network.
    pub fn attempts(&self) -> Option<u32> {
        match self {
            Self::RetrievalExhausted { attempts, .. } => Some(*attempts),
            _ => None,
        }
    }
}
