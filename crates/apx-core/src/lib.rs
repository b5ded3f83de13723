//! # apx-core — Foundational Types for the Asset Proxy
//!
//! Defines the type-system primitives shared by every other crate in the
//! workspace. It depends on nothing internal.
//!
//! ## Key Design Principles
//!
//! 1. **Validated identity newtype.** An [`AssetId`] can only be built from a
//!    name that is safe to use as a single path component inside the cache
//!    directory. No bare strings reach the filesystem.
//!
//! 2. **Validation before I/O.** [`FetchRequest::parse`] performs every
//!    client-input check. A request that fails here never touches the network
//!    or the disk.
//!
//! 3. **Known collision surface.** The cache identity is the final path
//!    segment of the source URL. Two URLs that share a final segment map to
//!    the same identity; the first one cached is served for both.
//!
//! ## Crate Policy
//!
//! - No dependencies on other `apx-*` crates (this is the leaf of the DAG).
//! - No `unsafe` code.
//! - No `panic!()` or `.unwrap()` outside tests.

pub mod asset;
pub mod error;
pub mod policy;
pub mod request;

pub use asset::{AssetId, STAGING_DIR};
pub use error::RequestError;
pub use policy::HostPolicy;
pub use request::FetchRequest;
