use axum::{Json, Router, routing::get};
use std::sync::Arc;

use crate::AppState;
use crate::models::Pong;

pub fn routes() -> Router<Arc<AppState>> {
    Router::new().route("/ping", get(ping))
}

/// GET /ping - Aliveness check
async fn ping() -> Json<Pong> {
    Json(Pong::default())
}
