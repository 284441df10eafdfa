//! Declared-length gate
//!
//! Asks the origin how big the resource is before anything expensive runs.
//! Only the response head is read. The length is advisory: an origin can lie,
//! but this is the only check that happens before an analyzer is spawned.
//!
//! The question goes out as `HEAD`. Origins that refuse `HEAD` with 405 or
//! 501 get a `GET` instead, whose body is never read. On that path the HTTP
//! client validates `Content-Length` itself, so a garbled value surfaces as an
//! upstream failure rather than [`DetectError::NonIntegerContentLength`].

use reqwest::header::{CONTENT_LENGTH, HeaderMap};
use reqwest::{Client, Response, StatusCode};

use super::DetectError;
use super::locator::ResourceLocator;

#[derive(Debug, Clone)]
pub struct SizeGate {
    http: Client,
    max_length: u64,
}

impl SizeGate {
    pub fn new(http: Client, max_length: u64) -> Self {
        Self { http, max_length }
    }

    /// Return the declared length of `locator` if it is within the ceiling.
    pub async fn check(&self, locator: &ResourceLocator) -> Result<u64, DetectError> {
        let mut response = self.http.head(locator.as_url().clone()).send().await?;
        if head_refused(response.status()) {
            tracing::debug!(status = %response.status(), "HEAD refused, retrying with GET");
            drop(response);
            response = self.http.get(locator.as_url().clone()).send().await?;
        }

        let (status, declared) = inspect(response);

        if !status.is_success() {
            return Err(DetectError::UpstreamStatus(status));
        }

        let length = declared?;
        if length > self.max_length {
            return Err(DetectError::ContentTooLarge {
                length,
                max: self.max_length,
            });
        }
        Ok(length)
    }
}

fn head_refused(status: StatusCode) -> bool {
    matches!(
        status,
        StatusCode::METHOD_NOT_ALLOWED | StatusCode::NOT_IMPLEMENTED
    )
}

/// Read what the gate needs, then drop the response so the body is never
/// pulled and the connection is released.
fn inspect(response: Response) -> (StatusCode, Result<u64, DetectError>) {
    (response.status(), declared_length(response.headers()))
}

/// Interpret the `Content-Length` header of a response head.
pub fn declared_length(headers: &HeaderMap) -> Result<u64, DetectError> {
    let value = headers
        .get(CONTENT_LENGTH)
        .ok_or(DetectError::MissingContentLength)?;

    let non_integer = || DetectError::NonIntegerContentLength {
        value: String::from_utf8_lossy(value.as_bytes()).into_owned(),
    };
    value
        .to_str()
        .map_err(|_| non_integer())?
        .trim()
        .parse::<u64>()
        .map_err(|_| non_integer())
}
