//! # Asset Identity
//!
//! The cache identity of an asset is the last path segment of its source URL.
//! [`AssetId`] wraps that segment after checking that it names exactly one
//! regular entry inside the flat cache directory.

use serde::{Deserialize, Serialize};

use crate::error::InvalidAssetName;

/// Name reserved inside the cache directory for in-progress downloads.
pub const STAGING_DIR: &str = ".staging";

/// Validated cache identity (a single filename).
///
/// Rejected names:
/// - empty, `.` and `..`
/// - anything containing `/`, `\` or NUL
/// - [`STAGING_DIR`], which the store keeps for in-progress downloads
///
/// Other dot-prefixed names are ordinary identities.
///
/// The name is kept exactly as it appears in the URL path, including any
/// percent-encoding.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct AssetId(String);

impl AssetId {
    /// Validate `name` as a cache identity.
    pub fn new(name: impl Into<String>) -> Result<Self, InvalidAssetName> {
        let name = name.into();
        let reason = if name.is_empty() {
            Some("name is empty")
        } else if name == "." || name == ".." {
            Some("name refers to a directory")
        } else if name.contains(['/', '\\', '\0']) {
            Some("name contains a path separator or NUL")
        } else if name == STAGING_DIR {
            Some("name is reserved for the staging area")
        } else {
            None
        };
        match reason {
            Some(reason) => Err(InvalidAssetName { name, reason }),
            None => Ok(Self(name)),
        }
    }

    /// The identity as a string slice.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for AssetId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

impl AsRef<str> for AssetId {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

impl TryFrom<String> for AssetId {
    type Error = InvalidAssetName;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

impl From<AssetId> for String {
    fn from(id: AssetId) -> Self {
        id.0
    }
}
