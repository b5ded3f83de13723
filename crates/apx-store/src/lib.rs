//! # apx-store — Cache Store
//!
//! A single flat directory of opaque asset files keyed by [`AssetId`].
//! Presence of a file in that directory is the only source of truth; there
//! is no manifest or index.
//!
//! ## Layout
//!
//! ```text
//! {root}/
//! ├── main.pak            committed assets, one file per identity
//! ├── audio.dat
//! └── .staging/           in-progress downloads, never served
//!     └── dl-a8Xk2q.part
//! ```
//!
//! ## Completeness Invariant
//!
//! Bytes are always written to a staging file first. A staged file is moved
//! into `{root}` only by [`StagedAsset::commit`], after its writer has been
//! flushed and synced, using a no-clobber rename. A file present in `{root}`
//! is therefore always complete, and an existing identity is never
//! overwritten (first writer wins).
//!
//! [`AssetId`]: apx_core::AssetId

pub mod error;
pub mod store;

pub use error::StoreError;
pub use store::{AssetStore, CommitOutcome, StagedAsset, StoredAsset, STAGING_DIR};
