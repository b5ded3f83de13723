//! # Request Errors
//!
//! Client-input failures detected while turning a raw `url` parameter into a
//! [`FetchRequest`](crate::FetchRequest). None of these are retried; all of
//! them are reported before any network or disk I/O happens.

use thiserror::Error;

/// Why an inbound fetch request was rejected.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum RequestError {
    /// The `url` parameter is absent or blank.
    #[error("missing url parameter")]
    MissingParameter,

    /// The parameter is not an absolute `http`/`https` URL.
    #[error("invalid url {url:?}: {reason}")]
    InvalidUrl { url: String, reason: String },

    /// No usable filename can be derived from the URL path.
    #[error("cannot determine filename from url {url:?}")]
    UnresolvableFilename { url: String },

    /// The URL's host is not on the configured allow-list.
    #[error("url host {host:?} is not allowed")]
    HostNotAllowed { host: String },
}

/// An asset name that cannot be used as a cache identity.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("invalid asset name {name:?}: {reason}")]
pub struct InvalidAssetName {
    pub name: String,
    pub reason: &'static str,
}
