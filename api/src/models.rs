//! Request and response bodies

use serde::{Deserialize, Serialize};

/// Client-facing wording for rejected requests
pub struct ErrorMessages;

impl ErrorMessages {
    pub const NO_CONTENT_HEADER: &'static str = "Remote server didn't return a Content-Length header.";
    pub const NON_INT_CONTENT_HEADER: &'static str =
        "Remote server returned a non-integer Content-Length header.";
    pub const CONTENT_TOO_BIG: &'static str = "The remote file was too big to download.";
    pub const INVALID_URL: &'static str = "URL must be a valid url!";
    pub const ANALYSIS_FAILED: &'static str = "The remote file could not be analyzed.";
}

/// Body of `POST /detectfile`
#[derive(Debug, Clone, Deserialize)]
pub struct SuspectUrl {
    pub url: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Pong {
    pub message: String,
}

impl Default for Pong {
    fn default() -> Self {
        Self {
            message: "Pong!".to_string(),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Dimensions {
    pub width: u32,
    pub height: u32,
}

/// Verdict for one probed resource
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProbeResult {
    pub safe: bool,
    /// Frames read, including the one that made the file unsafe
    pub scanned_count: u64,
    /// Geometry of the first frame; `None` when no frames were read
    pub dimensions: Option<Dimensions>,
    /// Pixel format of the first frame; empty when no frames were read
    pub format: String,
}

/// Error body, `{"detail": "..."}`
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ErrorDetail {
    pub detail: String,
}
