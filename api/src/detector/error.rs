//! Failure taxonomy for the detection pipeline.
//!
//! Nothing here knows about HTTP status codes; the route layer decides how
//! each variant is presented to clients.

use std::process::ExitStatus;
use std::time::Duration;

use reqwest::StatusCode;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum DetectError {
    /// The submitted locator is not an absolute http(s) URL with a host and path
    #[error("invalid url: {reason}")]
    InvalidUrl { reason: &'static str },

    #[error("remote server didn't return a Content-Length header")]
    MissingContentLength,

    #[error("remote server returned a non-integer Content-Length header: {value:?}")]
    NonIntegerContentLength { value: String },

    #[error("declared length of {length} bytes exceeds the {max} byte limit")]
    ContentTooLarge { length: u64, max: u64 },

    #[error("remote server responded with {0}")]
    UpstreamStatus(StatusCode),

    #[error("request to remote server failed: {0}")]
    Upstream(#[from] reqwest::Error),

    #[error("failed to spawn frame analyzer: {0}")]
    Spawn(#[source] std::io::Error),

    #[error("failed to read frame analyzer output: {0}")]
    AnalyzerIo(#[source] std::io::Error),

    #[error("malformed frame record {line:?}: {reason}")]
    MalformedFrameRecord { line: String, reason: &'static str },

    #[error("frame analyzer exited with {status}: {stderr}")]
    AnalyzerExit { status: ExitStatus, stderr: String },

    #[error("analysis did not reach a verdict within {0:?}")]
    AnalysisTimedOut(Duration),

    #[error("analysis did not reach a verdict within {0} frames")]
    FrameLimitExceeded(u64),
}

impl DetectError {
    /// True when the request itself (or the resource it names) is at fault,
    /// as opposed to the upstream origin or the analyzer.
    pub fn is_client_error(&self) -> bool {
        matches!(
            self,
            DetectError::InvalidUrl { .. }
                | DetectError::MissingContentLength
                | DetectError::NonIntegerContentLength { .. }
                | DetectError::ContentTooLarge { .. }
                | DetectError::FrameLimitExceeded(_)
        )
    }
}
