//! Root and health check endpoints

use std::sync::Arc;

use axum::{Json, Router, extract::State, routing::get};
use serde::Serialize;

use super::ApiState;

/// Root banner response
#[derive(Serialize)]
pub struct RootResponse {
    pub message: &'static str,
}

/// Health check response
#[derive(Serialize)]
pub struct HealthResponse {
    pub status: &'static str,
    pub version: &'static str,
}

/// Build root and health router
///
/// `GET /` is only mounted on surfaces that have a banner.
pub fn router(state: Arc<ApiState>) -> Router {
    let mut router = Router::new().route("/health", get(health));
    if state.surface.root_message().is_some() {
        router = router.route("/", get(root));
    }
    router.with_state(state)
}

async fn root(State(state): State<Arc<ApiState>>) -> Json<RootResponse> {
    Json(RootResponse {
        message: state.surface.root_message().unwrap_or_default(),
    })
}

/// Liveness probe - is the service running?
async fn health() -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "ok",
        version: env!("CARGO_PKG_VERSION"),
    })
}
