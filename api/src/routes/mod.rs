pub mod detect;
pub mod error;
pub mod general;

use axum::Router;
use std::sync::Arc;

use crate::AppState;

/// Build all routes for the API
pub fn build_routes() -> Router<Arc<AppState>> {
    Router::new()
        .merge(general::routes())
        .merge(detect::routes())
}
