//! # Fetch Requests
//!
//! Parses the raw `url` query parameter into a [`FetchRequest`].
//!
//! ## Validation Order
//!
//! 1. Absent or blank parameter → [`RequestError::MissingParameter`].
//! 2. Backslashes are normalized to forward slashes, so origin URLs authored
//!    with Windows-style paths still resolve.
//! 3. The result must be an absolute `http`/`https` URL →
//!    [`RequestError::InvalidUrl`].
//! 4. The last path segment must be a valid [`AssetId`] →
//!    [`RequestError::UnresolvableFilename`].

use url::Url;

use crate::asset::AssetId;
use crate::error::RequestError;

/// A validated request for one asset.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FetchRequest {
    /// Normalized source URL the asset is downloaded from.
    pub source: Url,
    /// Cache identity derived from the final path segment of `source`.
    pub asset_id: AssetId,
}

impl FetchRequest {
    /// Parse and validate the raw `url` parameter.
    pub fn parse(raw: Option<&str>) -> Result<Self, RequestError> {
        let raw = raw.map(str::trim).unwrap_or_default();
        if raw.is_empty() {
            return Err(RequestError::MissingParameter);
        }

        let normalized = raw.replace('\\', "/");
        let source = Url::parse(&normalized).map_err(|e| RequestError::InvalidUrl {
            url: normalized.clone(),
            reason: e.to_string(),
        })?;
        if !matches!(source.scheme(), "http" | "https") {
            return Err(RequestError::InvalidUrl {
                url: normalized,
                reason: format!("unsupported scheme {:?}", source.scheme()),
            });
        }

        let asset_id = basename(&source)
            .and_then(|name| AssetId::new(name).ok())
            .ok_or_else(|| RequestError::UnresolvableFilename {
                url: source.to_string(),
            })?;

        Ok(Self { source, asset_id })
    }

    /// Host component of the source URL, if any.
    pub fn host(&self) -> Option<&str> {
        self.source.host_str()
    }
}

/// Last segment of the URL path, ignoring query and fragment.
fn basename(url: &Url) -> Option<&str> {
    url.path().rsplit('/').next().filter(|s| !s.is_empty())
}
