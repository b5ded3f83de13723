//! # Origin Host Policy
//!
//! Optional allow-list of origin hosts. The default policy accepts any host.

use crate::error::RequestError;
use crate::request::FetchRequest;

/// Which origin hosts the proxy will download from.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub enum HostPolicy {
    /// Any host is accepted.
    #[default]
    Any,
    /// Only the listed hosts (lowercase, exact match) are accepted.
    AllowList(Vec<String>),
}

impl HostPolicy {
    /// Build a policy from a comma-separated host list.
    ///
    /// Blank entries are ignored; an empty list yields [`HostPolicy::Any`].
    pub fn from_list(list: &str) -> Self {
        let hosts: Vec<String> = list
            .split(',')
            .map(|h| h.trim().to_ascii_lowercase())
            .filter(|h| !h.is_empty())
            .collect();
        if hosts.is_empty() {
            Self::Any
        } else {
            Self::AllowList(hosts)
        }
    }

    /// Check that the request's host is permitted.
    pub fn check(&self, request: &FetchRequest) -> Result<(), RequestError> {
        match self {
            Self::Any => Ok(()),
            Self::AllowList(hosts) => {
                let host = request.host().unwrap_or_default().to_ascii_lowercase();
                if hosts.iter().any(|h| *h == host) {
                    Ok(())
                } else {
                    Err(RequestError::HostNotAllowed { host })
                }
            }
        }
    }
}
