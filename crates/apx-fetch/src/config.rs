//! Retrieval engine configuration.
//!
//! Defaults match the proxy's documented behavior: 3 attempts, a 10 second
//! network timeout, a 1 second backoff base (2 s then 4 s between attempts),
//! and 8192-byte chunks. Override via environment variables or explicit
//! construction for testing.

use std::time::Duration;

use crate::retry::Backoff;

/// Default number of retrieval attempts.
pub const DEFAULT_MAX_ATTEMPTS: u32 = 3;

/// Default per-attempt network timeout in seconds.
pub const DEFAULT_TIMEOUT_SECS: u64 = 10;

/// Default backoff base in milliseconds.
pub const DEFAULT_BACKOFF_BASE_MS: u64 = 1000;

/// Default write and stream chunk size in bytes.
pub const DEFAULT_CHUNK_SIZE: usize = 8192;

/// Configuration for origin retrieval.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FetchConfig {
    /// Total attempts per retrieval, including the first.
    pub max_attempts: u32,
    /// Timeout for connecting, receiving the response head, and each body read.
    pub timeout: Duration,
    /// Backoff base; the delay after attempt `n` is `backoff_base * 2^n`.
    pub backoff_base: Duration,
    /// Largest single write to the cache, and read size when streaming to
    /// clients.
    pub chunk_size: usize,
}

impl Default for FetchConfig {
    fn default() -> Self {
        Self {
            max_attempts: DEFAULT_MAX_ATTEMPTS,
            timeout: Duration::from_secs(DEFAULT_TIMEOUT_SECS),
            backoff_base: Duration::from_millis(DEFAULT_BACKOFF_BASE_MS),
            chunk_size: DEFAULT_CHUNK_SIZE,
        }
    }
}

impl FetchConfig {
    /// Load configuration from environment variables.
    ///
    /// Variables:
    /// - `APX_MAX_ATTEMPTS` (default: 3, must be at least 1)
    /// - `APX_TIMEOUT_SECS` (default: 10, must be at least 1)
    /// - `APX_BACKOFF_BASE_MS` (default: 1000)
    /// - `APX_CHUNK_SIZE` (default: 8192, must be at least 1)
    pub fn from_env() -> Result<Self, ConfigError> {
        let config = Self {
            max_attempts: env_parse("APX_MAX_ATTEMPTS", DEFAULT_MAX_ATTEMPTS)?,
            timeout: Duration::from_secs(env_parse("APX_TIMEOUT_SECS", DEFAULT_TIMEOUT_SECS)?),
            backoff_base: Duration::from_millis(env_parse(
                "APX_BACKOFF_BASE_MS",
                DEFAULT_BACKOFF_BASE_MS,
            )?),
            chunk_size: env_parse("APX_CHUNK_SIZE", DEFAULT_CHUNK_SIZE)?,
        };
        config.validate()?;
        Ok(config)
    }

    /// Reject values the engine cannot run with.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.max_attempts == 0 {
            return Err(ConfigError::Invalid {
                var: "APX_MAX_ATTEMPTS",
                reason: "must be at least 1".into(),
            });
        }
        if self.timeout.is_zero() {
            return Err(ConfigError::Invalid {
                var: "APX_TIMEOUT_SECS",
                reason: "must be at least 1".into(),
            });
        }
        if self.chunk_size == 0 {
            return Err(ConfigError::Invalid {
                var: "APX_CHUNK_SIZE",
                reason: "must be at least 1".into(),
            });
        }
        Ok(())
    }

    /// Backoff policy derived from this configuration.
    pub fn backoff(&self) -> Backoff {
        Backoff {
            max_attempts: self.max_attempts,
            base: self.backoff_base,
        }
    }
}

fn env_parse<T>(var: &'static str, default: T) -> Result<T, ConfigError>
where
    T: std::str::FromStr,
    T::Err: std::fmt::Display,
{
    match std::env::var(var) {
        Ok(raw) => raw.trim().parse().map_err(|e: T::Err| ConfigError::Invalid {
            var,
            reason: format!("{raw:?}: {e}"),
        }),
        Err(_) => Ok(default),
    }
}

/// Configuration errors.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("invalid value for {var}: {reason}")]
    Invalid { var: &'static str, reason: String },
}
