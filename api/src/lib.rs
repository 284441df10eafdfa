//! Crash detector: checks whether a remote video keeps one frame size and
//! pixel format from start to finish.
//!
//! Players that assume uniform geometry can crash on files that switch
//! resolution or pixel format mid-stream. `POST /detectfile` answers whether a
//! URL is such a file, without downloading it into the service.

pub mod config;
pub mod constants;
pub mod detector;
pub mod logging;
pub mod models;
pub mod routes;

#[cfg(test)]
mod test_support;

use axum::Router;
use reqwest::Client;
use std::sync::Arc;
use tower_http::trace::TraceLayer;

use config::Config;
use constants::USER_AGENT;
use detector::{Detector, SizeGate};

#[derive(Clone)]
pub struct AppState {
    pub detector: Detector,
}

impl AppState {
    /// `http` is shared by every request for the lifetime of the state.
    pub fn new(config: &Config, http: Client) -> Self {
        let gate = SizeGate::new(http, config.max_content_length);
        Self {
            detector: Detector::new(gate, config.analysis()),
        }
    }
}

/// The outbound HTTP client used for size checks.
pub fn build_http_client(config: &Config) -> reqwest::Result<Client> {
    Client::builder()
        .user_agent(USER_AGENT)
        .timeout(config.upstream_timeout)
        .build()
}

pub fn app(state: Arc<AppState>) -> Router {
    routes::build_routes()
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}
