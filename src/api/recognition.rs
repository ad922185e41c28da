//! Frame recognition endpoints

use std::sync::Arc;

use axum::{
    Json, Router,
    body::Bytes,
    extract::{State, rejection::BytesRejection},
    routing::{get, post},
};
use serde::Deserialize;

use super::body::optional_json;
use super::{ApiError, ApiState};
use crate::recognition::DetectionResult;
use crate::vision;

/// Build recognition router
pub fn router(state: Arc<ApiState>) -> Router {
    Router::new()
        .route("/api/process_frame", post(process_frame))
        .route("/api/get_last_detection", get(get_last_detection))
        .with_state(state)
}

/// Frame request
#[derive(Debug, Default, Deserialize)]
pub struct ProcessFrameRequest {
    /// `data:image/...;base64,...` URL of one camera frame
    pub image_data: Option<String>,
}

/// Recognize the letter in one camera frame
///
/// The outcome replaces the session's last detection whether or not a
/// letter was accepted.
async fn process_frame(
    State(state): State<Arc<ApiState>>,
    body: Result<Bytes, BytesRejection>,
) -> Result<Json<DetectionResult>, ApiError> {
    let recognizer = state
        .recognizer
        .clone()
        .ok_or(ApiError::NotInitialized("Model or tracker not initialized"))?;

    let image_data = optional_json::<ProcessFrameRequest>(body)?
        .and_then(|request| request.image_data)
        .ok_or_else(|| ApiError::BadRequest("No image_data found".to_string()))?;

    let frame = vision::decode_data_url(&image_data)?;

    let result = tokio::task::spawn_blocking(move || recognizer.recognize(&frame))
        .await
        .map_err(|e| ApiError::Internal(format!("recognition task failed: {e}")))??;

    state.session.lock().await.record_detection(result.clone());

    Ok(Json(result))
}

/// Outcome of the most recent frame
async fn get_last_detection(State(state): State<Arc<ApiState>>) -> Json<DetectionResult> {
    Json(state.session.lock().await.last_detection().clone())
}
