use axum::{Json, Router, extract::State, routing::post};
use std::sync::Arc;

use crate::AppState;
use crate::detector::ResourceLocator;
use crate::models::{ProbeResult, SuspectUrl};
use crate::routes::error::ApiError;

pub fn routes() -> Router<Arc<AppState>> {
    Router::new().route("/detectfile", post(detect_file))
}

/// POST /detectfile - Check whether a remote video changes frame size or
/// pixel format partway through
async fn detect_file(
    State(state): State<Arc<AppState>>,
    Json(request): Json<SuspectUrl>,
) -> Result<Json<ProbeResult>, ApiError> {
    let locator = ResourceLocator::parse(&request.url)?;
    let result = state.detector.probe(&locator).await?;
    Ok(Json(result))
}
