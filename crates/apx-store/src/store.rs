//! # Asset Store
//!
//! [`AssetStore`] answers "is this identity cached?" and "give me its bytes",
//! and hands out [`StagedAsset`] writers for new content.

use std::io::ErrorKind;
use std::path::{Path, PathBuf};

use apx_core::AssetId;
use tempfile::TempPath;
use tokio::fs::File;
use tokio::io::{AsyncWriteExt, BufWriter};

use crate::error::StoreError;

/// Name of the staging subdirectory inside the cache root. No [`AssetId`]
/// can take this name.
pub use apx_core::STAGING_DIR;

/// Prefix of every staging file. Kept short and independent of the identity
/// so a staging name never exceeds the filesystem's name length limit.
const STAGING_PREFIX: &str = "dl-";

/// Result of committing a staged asset.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CommitOutcome {
    /// The staged bytes became the cached asset.
    Stored,
    /// Another writer committed the identity first; the staged bytes were
    /// discarded and the existing asset was left untouched.
    AlreadyPresent,
}

/// An open, committed asset.
#[derive(Debug)]
pub struct StoredAsset {
    pub file: File,
    pub len: u64,
}

/// Flat-directory asset store.
#[derive(Debug, Clone)]
pub struct AssetStore {
    root: PathBuf,
    staging: PathBuf,
}

impl AssetStore {
    /// Create the store rooted at `root`, creating the cache and staging
    /// directories if they do not exist. Safe to call on an existing store.
    pub fn init(root: impl Into<PathBuf>) -> Result<Self, StoreError> {
        let root = root.into();
        let staging = root.join(STAGING_DIR);
        std::fs::create_dir_all(&staging).map_err(|source| StoreError::Init {
            path: staging.clone(),
            source,
        })?;
        Ok(Self { root, staging })
    }

    /// Root directory of the store.
    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Final path of `id` inside the store.
    pub fn path_of(&self, id: &AssetId) -> PathBuf {
        self.root.join(id.as_str())
    }

    /// Whether `id` is cached as a regular file.
    pub async fn exists(&self, id: &AssetId) -> bool {
        tokio::fs::metadata(self.path_of(id))
            .await
            .map(|m| m.is_file())
            .unwrap_or(false)
    }

    /// Whether the cache root is currently reachable as a directory.
    pub async fn is_accessible(&self) -> bool {
        tokio::fs::metadata(&self.root)
            .await
            .map(|m| m.is_dir())
            .unwrap_or(false)
    }

    /// Open a committed asset for reading.
    ///
    /// Fails with [`StoreError::NotAFile`] when the entry under `id` is a
    /// directory or other non-regular file.
    pub async fn open(&self, id: &AssetId) -> Result<StoredAsset, StoreError> {
        let open_err = |source| StoreError::Open {
            id: id.clone(),
            source,
        };
        let file = File::open(self.path_of(id)).await.map_err(open_err)?;
        let metadata = file.metadata().await.map_err(open_err)?;
        if !metadata.is_file() {
            return Err(StoreError::NotAFile { id: id.clone() });
        }
        Ok(StoredAsset {
            file,
            len: metadata.len(),
        })
    }

    /// Create a staging file for `id`. Disk writes are at most `chunk_size`
    /// bytes each.
    ///
    /// Nothing becomes visible under the cache root until the returned
    /// [`StagedAsset`] is committed.
    pub fn stage(&self, id: &AssetId, chunk_size: usize) -> Result<StagedAsset, StoreError> {
        let chunk_size = chunk_size.max(1);
        let staged = tempfile::Builder::new()
            .prefix(STAGING_PREFIX)
            .suffix(".part")
            .tempfile_in(&self.staging)
            .map_err(|source| StoreError::Stage {
                id: id.clone(),
                source,
            })?;
        let (file, path) = staged.into_parts();

        Ok(StagedAsset {
            id: id.clone(),
            target: self.path_of(id),
            writer: BufWriter::with_capacity(chunk_size, File::from_std(file)),
            chunk_size,
            path,
            written: 0,
        })
    }

    /// Remove leftover staging files from an earlier run.
    ///
    /// Must only run while no downloads are in progress (at startup).
    pub fn sweep_staging(&self) -> Result<usize, StoreError> {
        let sweep_err = |source| StoreError::Sweep {
            path: self.staging.clone(),
            source,
        };
        let mut removed = 0;
        for entry in std::fs::read_dir(&self.staging).map_err(sweep_err)? {
            let path = entry.map_err(sweep_err)?.path();
            if path.is_file() {
                match std::fs::remove_file(&path) {
                    Ok(()) => removed += 1,
                    Err(e) if e.kind() == ErrorKind::NotFound => {}
                    Err(e) => return Err(sweep_err(e)),
                }
            }
        }
        if removed > 0 {
            tracing::info!(removed, dir = %self.staging.display(), "swept stale staging files");
        }
        Ok(removed)
    }
}

/// In-progress asset content.
///
/// Dropping a `StagedAsset` without committing deletes its staging file.
#[derive(Debug)]
pub struct StagedAsset {
    id: AssetId,
    target: PathBuf,
    writer: BufWriter<File>,
    chunk_size: usize,
    path: TempPath,
    written: u64,
}

impl StagedAsset {
    /// Identity being staged.
    pub fn id(&self) -> &AssetId {
        &self.id
    }

    /// Bytes written so far.
    pub fn written(&self) -> u64 {
        self.written
    }

    /// Append bytes to the staging file.
    ///
    /// Input larger than the chunk size is split so the buffered writer never
    /// passes more than `chunk_size` bytes to the file in one write.
    pub async fn write(&mut self, bytes: &[u8]) -> Result<(), StoreError> {
        for piece in bytes.chunks(self.chunk_size) {
            self.writer
                .write_all(piece)
                .await
                .map_err(|source| StoreError::Write {
                    id: self.id.clone(),
                    source,
                })?;
            self.written += piece.len() as u64;
        }
        Ok(())
    }

    /// Flush, sync, and move the staged file into the cache.
    ///
    /// Uses a no-clobber rename: if the identity was committed by someone
    /// else in the meantime, the existing file wins and
    /// [`CommitOutcome::AlreadyPresent`] is returned.
    pub async fn commit(self) -> Result<CommitOutcome, StoreError> {
        let Self {
            id,
            target,
            mut writer,
            path,
            ..
        } = self;
        let commit_err = |source| StoreError::Commit {
            id: id.clone(),
            source,
        };

        writer.flush().await.map_err(commit_err)?;
        let file = writer.into_inner();
        file.sync_all().await.map_err(commit_err)?;
        drop(file);

        match path.persist_noclobber(&target) {
            Ok(()) => Ok(CommitOutcome::Stored),
            // The rejected staging file is removed when `e.path` drops.
            Err(e) if e.error.kind() == ErrorKind::AlreadyExists => Ok(CommitOutcome::AlreadyPresent),
            Err(e) => Err(commit_err(e.error)),
        }
    }
}
