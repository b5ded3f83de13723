//! Cache store error types.

use std::path::PathBuf;

use apx_core::AssetId;

/// Errors from cache store operations.
#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    /// The cache or staging directory could not be created.
    #[error("failed to prepare cache directory {}: {source}", path.display())]
    Init {
        path: PathBuf,
        source: std::io::Error,
    },

    /// A committed asset could not be opened for reading.
    #[error("failed to open cached asset {id}: {source}")]
    Open {
        id: AssetId,
        source: std::io::Error,
    },

    /// The entry under the identity is not a regular file.
    #[error("cached entry {id} is not a regular file")]
    NotAFile { id: AssetId },

    /// A staging file could not be created.
    #[error("failed to stage asset {id}: {source}")]
    Stage {
        id: AssetId,
        source: std::io::Error,
    },

    /// Writing to a staging file failed.
    #[error("failed to write asset {id}: {source}")]
    Write {
        id: AssetId,
        source: std::io::Error,
    },

    /// Moving a staged asset into the cache failed.
    #[error("failed to commit asset {id}: {source}")]
    Commit {
        id: AssetId,
        source: std::io::Error,
    },

    /// Leftover staging files could not be removed.
    #[error("failed to sweep staging area {}: {source}", path.display())]
    Sweep {
        path: PathBuf,
        source: std::io::Error,
    },
}
