//! # Application State
//!
//! Immutable configuration plus the shared services every request uses.
//! Constructed once at startup by [`bootstrap`](crate::bootstrap::bootstrap)
//! and cloned into each handler via the `State` extractor.

use std::path::PathBuf;
use std::sync::Arc;

use apx_core::{AssetId, HostPolicy};
use apx_fetch::{ConfigError, FetchConfig, FetchError, Retrieved, Retriever, SingleFlight};
use apx_store::AssetStore;

use crate::middleware::metrics::ApiMetrics;

/// Default listening port.
pub const DEFAULT_PORT: u16 = 8000;

/// Default cache directory, relative to the working directory.
pub const DEFAULT_CACHE_DIR: &str = "assets";

/// Process-wide configuration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AppConfig {
    /// Port to bind the HTTP server to.
    pub port: u16,
    /// Flat directory holding cached assets.
    pub cache_dir: PathBuf,
    /// Which origin hosts may be fetched from.
    pub host_policy: HostPolicy,
    /// Retrieval engine settings.
    pub fetch: FetchConfig,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            port: DEFAULT_PORT,
            cache_dir: PathBuf::from(DEFAULT_CACHE_DIR),
            host_policy: HostPolicy::Any,
            fetch: FetchConfig::default(),
        }
    }
}

impl AppConfig {
    /// Load configuration from environment variables.
    ///
    /// Variables:
    /// - `PORT` (default: 8000)
    /// - `APX_CACHE_DIR` (default: `assets`)
    /// - `APX_ALLOWED_HOSTS` (default: unset, any host)
    /// - plus the retrieval variables read by [`FetchConfig::from_env`]
    pub fn from_env() -> Result<Self, ConfigError> {
        let port = match std::env::var("PORT") {
            Ok(raw) => raw.trim().parse().map_err(|e| ConfigError::Invalid {
                var: "PORT",
                reason: format!("{raw:?}: {e}"),
            })?,
            Err(_) => DEFAULT_PORT,
        };
        let cache_dir = std::env::var_os("APX_CACHE_DIR")
            .map(PathBuf::from)
            .unwrap_or_else(|| PathBuf::from(DEFAULT_CACHE_DIR));
        let host_policy = std::env::var("APX_ALLOWED_HOSTS")
            .map(|list| HostPolicy::from_list(&list))
            .unwrap_or_default();

        Ok(Self {
            port,
            cache_dir,
            host_policy,
            fetch: FetchConfig::from_env()?,
        })
    }
}

/// How a cache miss was resolved by the claim leader.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Population {
    /// Another request committed the asset between the presence check and
    /// the claim.
    AlreadyCached,
    /// The asset was downloaded from the origin.
    Downloaded(Retrieved),
}

/// Shared outcome of one single-flight retrieval.
pub type PopulationOutcome = Result<Population, Arc<FetchError>>;

/// Shared application state passed to all route handlers.
#[derive(Debug, Clone)]
pub struct AppState {
    pub config: Arc<AppConfig>,
    pub store: AssetStore,
    pub retriever: Retriever,
    pub inflight: SingleFlight<AssetId, PopulationOutcome>,
    pub metrics: ApiMetrics,
}

impl AppState {
    /// Assemble state from already-initialized services.
    pub fn new(config: AppConfig, store: AssetStore, retriever: Retriever) -> Self {
        Self {
            config: Arc::new(config),
            store,
            retriever,
            inflight: SingleFlight::new(),
            metrics: ApiMetrics::new(),
        }
    }
}
