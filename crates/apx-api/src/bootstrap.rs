//! # Service Bootstrap
//!
//! Prepares everything the service needs before it accepts connections.
//!
//! ## Bootstrap Sequence
//!
//! 1. **Open the cache store**: create the cache and staging directories
//!    (idempotent).
//! 2. **Sweep staging**: delete partial downloads left by a previous run.
//! 3. **Build the retriever**: construct the HTTP client.
//! 4. **Log a startup banner** with the effective configuration.

use apx_fetch::{FetchError, Retriever};
use apx_store::{AssetStore, StoreError};

use crate::state::{AppConfig, AppState};

/// Errors during service bootstrap.
#[derive(Debug, thiserror::Error)]
pub enum BootstrapError {
    /// The cache directory could not be prepared.
    #[error("cache store error: {0}")]
    Store(#[from] StoreError),

    /// The HTTP client could not be built.
    #[error("retriever error: {0}")]
    Retriever(#[from] FetchError),
}

/// Build the application state from configuration.
pub fn bootstrap(config: AppConfig) -> Result<AppState, BootstrapError> {
    let store = AssetStore::init(&config.cache_dir)?;
    store.sweep_staging()?;
    let retriever = Retriever::new(config.fetch.clone())?;

    tracing::info!(
        cache_dir = %store.root().display(),
        max_attempts = config.fetch.max_attempts,
        timeout = ?config.fetch.timeout,
        backoff_base = ?config.fetch.backoff_base,
        chunk_size = config.fetch.chunk_size,
        host_policy = ?config.host_policy,
        "asset proxy configured"
    );

    Ok(AppState::new(config, store, retriever))
}

#[cfg(test)]
mod tests {
    use super::*;
    use apx_store::STAGING_DIR;

    #[test]
    fn bootstrap_creates_cache_dir_and_sweeps_staging() {
        let dir = tempfile::tempdir().unwrap();
        let cache_dir = dir.path().join("assets");
        std::fs::create_dir_all(cache_dir.join(STAGING_DIR)).unwrap();
        std::fs::write(cache_dir.join(STAGING_DIR).join("dl-abc123.part"), b"partial").unwrap();

        let config = AppConfig {
            cache_dir: cache_dir.clone(),
            ..AppConfig::default()
        };
        let state = bootstrap(config).unwrap();

        assert_eq!(state.store.root(), cache_dir.as_path());
        assert_eq!(std::fs::read_dir(cache_dir.join(STAGING_DIR)).unwrap().count(), 0);
    }

    #[test]
    fn bootstrap_fails_when_cache_dir_is_a_file() {
        let dir = tempfile::tempdir().unwrap();
        let blocker = dir.path().join("assets");
        std::fs::write(&blocker, b"not a directory").unwrap();

        let config = AppConfig {
            cache_dir: blocker,
            ..AppConfig::default()
        };
        assert!(matches!(bootstrap(config), Err(BootstrapError::Store(_))));
    }
}
