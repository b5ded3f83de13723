//! Origin download into the cache store.

use std::time::Duration;

use apx_core::AssetId;
use apx_store::{AssetStore, CommitOutcome};
use url::Url;

use crate::config::FetchConfig;
use crate::error::{AttemptError, FetchError};
use crate::retry::{retry_with_backoff, RetryError};

/// Summary of a successful retrieval.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Retrieved {
    /// Bytes received from the origin on the successful attempt.
    pub bytes: u64,
    /// Attempt number that succeeded (1-based).
    pub attempts: u32,
    /// Whether our bytes became the cached asset or an earlier commit won.
    pub outcome: CommitOutcome,
}

/// Downloads assets from their origin with bounded retry.
#[derive(Debug, Clone)]
pub struct Retriever {
    http: reqwest::Client,
    config: FetchConfig,
}

impl Retriever {
    /// Create a retriever with its own HTTP client.
    pub fn new(config: FetchConfig) -> Result<Self, FetchError> {
        let http = reqwest::Client::builder()
            .connect_timeout(config.timeout)
            .user_agent(concat!("apx/", env!("CARGO_PKG_VERSION")))
            .build()
            .map_err(FetchError::Client)?;
        Ok(Self { http, config })
    }

    /// Active configuration.
    pub fn config(&self) -> &FetchConfig {
        &self.config
    }

    /// Download `url` and commit it to `store` under `id`.
    ///
    /// Network failures are retried per the configured backoff; storage
    /// failures abort immediately. Nothing is left under the cache root
    /// unless an attempt completes.
    pub async fn retrieve(
        &self,
        url: &Url,
        store: &AssetStore,
        id: &AssetId,
    ) -> Result<Retrieved, FetchError> {
        tracing::info!(asset = %id, %url, "retrieving asset from origin");

        let backoff = self.config.backoff();
        let result =
            retry_with_backoff(&backoff, |attempt| self.attempt(url, store, id, attempt)).await;

        match result {
            Ok(retrieved) => {
                tracing::info!(
                    asset = %id,
                    bytes = retrieved.bytes,
                    attempts = retrieved.attempts,
                    outcome = ?retrieved.outcome,
                    "asset retrieved"
                );
                Ok(retrieved)
            }
            Err(RetryError::Exhausted { attempts, last }) => {
                Err(FetchError::RetrievalExhausted { attempts, last })
            }
            Err(RetryError::Aborted {
                error: AttemptError::Store(e),
                ..
            }) => Err(FetchError::Store(e)),
            Err(RetryError::Aborted { attempt, error }) => Err(FetchError::RetrievalExhausted {
                attempts: attempt,
                last: error,
            }),
        }
    }

    async fn attempt(
        &self,
        url: &Url,
        store: &AssetStore,
        id: &AssetId,
        attempt: u32,
    ) -> Result<Retrieved, AttemptError> {
        let timeout = self.config.timeout;
        tracing::debug!(asset = %id, attempt, "opening origin stream");

        let mut response = within(timeout, "response headers", self.http.get(url.clone()).send())
            .await?
            .map_err(|source| transport(url, source))?;

        let status = response.status();
        if !status.is_success() {
            return Err(AttemptError::Status {
                status: status.as_u16(),
            });
        }
        let expected = response.content_length();

        // Dropping `staged` on any early return discards the partial file.
        let mut staged = store.stage(id, self.config.chunk_size)?;
        while let Some(chunk) = within(timeout, "response body", response.chunk())
            .await?
            .map_err(|source| transport(url, source))?
        {
            staged.write(&chunk).await?;
        }

        let received = staged.written();
        if let Some(expected) = expected {
            if received != expected {
                return Err(AttemptError::Truncated { expected, received });
            }
        }

        let outcome = staged.commit().await?;
        Ok(Retrieved {
            bytes: received,
            attempts: attempt,
            outcome,
        })
    }
}

async fn within<F: std::future::Future>(
    after: Duration,
    stage: &'static str,
    fut: F,
) -> Result<F::Output, AttemptError> {
    tokio::time::timeout(after, fut)
        .await
        .map_err(|_| AttemptError::Timeout { stage, after })
}

fn transport(url: &Url, source: reqwest::Error) -> AttemptError {
    AttemptError::Transport {
        url: url.to_string(),
        source,
    }
}
