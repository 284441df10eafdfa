//! Error translation for route handlers
//!
//! The detection pipeline reports failures as [`DetectError`]; this is the
//! only place they become HTTP statuses.

use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};

use crate::detector::DetectError;
use crate::models::{ErrorDetail, ErrorMessages};

#[derive(Debug)]
pub struct ApiError(pub DetectError);

impl From<DetectError> for ApiError {
    fn from(err: DetectError) -> Self {
        ApiError(err)
    }
}

impl ApiError {
    pub fn status(&self) -> StatusCode {
        match &self.0 {
            DetectError::InvalidUrl { .. } => StatusCode::UNPROCESSABLE_ENTITY,
            DetectError::MissingContentLength | DetectError::NonIntegerContentLength { .. } => {
                StatusCode::BAD_REQUEST
            }
            DetectError::ContentTooLarge { .. } => StatusCode::PAYLOAD_TOO_LARGE,
            DetectError::UpstreamStatus(_) | DetectError::Upstream(_) => StatusCode::BAD_GATEWAY,
            DetectError::FrameLimitExceeded(_) => StatusCode::UNPROCESSABLE_ENTITY,
            DetectError::AnalysisTimedOut(_) => StatusCode::GATEWAY_TIMEOUT,
            DetectError::Spawn(_)
            | DetectError::AnalyzerIo(_)
            | DetectError::MalformedFrameRecord { .. }
            | DetectError::AnalyzerExit { .. } => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    fn detail(&self) -> String {
        match &self.0 {
            DetectError::InvalidUrl { .. } => ErrorMessages::INVALID_URL.to_string(),
            DetectError::MissingContentLength => ErrorMessages::NO_CONTENT_HEADER.to_string(),
            DetectError::NonIntegerContentLength { .. } => {
                ErrorMessages::NON_INT_CONTENT_HEADER.to_string()
            }
            DetectError::ContentTooLarge { .. } => ErrorMessages::CONTENT_TOO_BIG.to_string(),
            // Analyzer output and stderr stay in the logs
            DetectError::Spawn(_)
            | DetectError::AnalyzerIo(_)
            | DetectError::MalformedFrameRecord { .. }
            | DetectError::AnalyzerExit { .. } => ErrorMessages::ANALYSIS_FAILED.to_string(),
            other => other.to_string(),
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status();
        if status.is_server_error() {
            tracing::error!(%status, "detectfile failed: {}", self.0);
        } else {
            tracing::info!(
                %status,
                client_error = self.0.is_client_error(),
                "detectfile rejected: {}",
                self.0
            );
        }

        let body = ErrorDetail {
            detail: self.detail(),
        };
        (status, Json(body)).into_response()
    }
}
