//! Validated remote resource locators

use std::fmt;

use url::Url;

use super::DetectError;

const ALLOWED_SCHEMES: [&str; 2] = ["http", "https"];

/// An absolute `http`/`https` URL with a non-empty host and path.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResourceLocator(Url);

impl ResourceLocator {
    pub fn parse(raw: &str) -> Result<Self, DetectError> {
        let raw = raw.trim();
        let url = Url::parse(raw).map_err(|_| DetectError::InvalidUrl {
            reason: "not an absolute url",
        })?;

        if !ALLOWED_SCHEMES.contains(&url.scheme()) {
            return Err(DetectError::InvalidUrl {
                reason: "scheme must be http or https",
            });
        }
        if url.host_str().is_none_or(str::is_empty) {
            return Err(DetectError::InvalidUrl {
                reason: "missing host",
            });
        }
        // The parser normalizes an absent path to "/", so look at the input
        if !has_explicit_path(raw) {
            return Err(DetectError::InvalidUrl {
                reason: "missing path",
            });
        }

        Ok(Self(url))
    }

    pub fn as_str(&self) -> &str {
        self.0.as_str()
    }

    pub fn as_url(&self) -> &Url {
        &self.0
    }
}

impl fmt::Display for ResourceLocator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

fn has_explicit_path(raw: &str) -> bool {
    raw.split_once("://")
        .and_then(|(_, rest)| rest.find(['/', '?', '#']).map(|i| rest[i..].starts_with('/')))
        .unwrap_or(false)
}
