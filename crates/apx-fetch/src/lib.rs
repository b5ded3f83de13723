//! # apx-fetch — Retrieval Engine
//!
//! Downloads an asset from its origin into the cache store when it is not
//! already cached.
//!
//! ## Attempt Model
//!
//! Each attempt streams the response body into a fresh
//! [`StagedAsset`](apx_store::StagedAsset) and commits it only after the
//! origin signals end-of-stream. Network-layer failures (timeouts, connection
//! errors, non-success status codes, short bodies) are retried with
//! exponential backoff; local storage failures are not. After the last
//! attempt fails, [`FetchError::RetrievalExhausted`] carries the attempt
//! count and the last underlying error.
//!
//! ## Coordination
//!
//! [`SingleFlight`] guarantees at most one retrieval per identity at a time.
//! Concurrent callers for the same identity wait for the running retrieval
//! and share its outcome.

pub mod config;
pub mod error;
pub mod retriever;
pub mod retry;
pub mod singleflight;

pub use config::{ConfigError, FetchConfig};
pub use error::{AttemptError, FetchError};
pub use retriever::{Retrieved, Retriever};
pub use retry::Backoff;
pub use singleflight::{Abandoned, Role, SingleFlight};
