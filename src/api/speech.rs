//! Speech synthesis endpoint

use std::sync::Arc;

use axum::{
    Json, Router,
    body::Bytes,
    extract::{State, rejection::BytesRejection},
    http::{HeaderMap, header},
    routing::post,
};
use serde::Deserialize;

use super::body::optional_json;
use super::{ApiError, ApiState};
use crate::config::Surface;
use crate::speech::SpokenAudio;

/// Build speech router
pub fn router(state: Arc<ApiState>) -> Router {
    Router::new()
        .route("/api/speak", post(speak))
        .with_state(state)
}

/// Speak request
///
/// When `text` is absent the current word is spoken, except on the
/// speech-only surface where it is required.
#[derive(Debug, Default, Deserialize)]
pub struct SpeakRequest {
    pub text: Option<String>,
}

/// Synthesize text to a WAV file and return its URL
async fn speak(
    State(state): State<Arc<ApiState>>,
    headers: HeaderMap,
    body: Result<Bytes, BytesRejection>,
) -> Result<Json<SpokenAudio>, ApiError> {
    let tts_only = state.surface == Surface::Tts;

    let speech = state.speech.clone().ok_or(ApiError::NotInitialized(if tts_only {
        "TTS Pipeline not initialized on TTS Service"
    } else {
        "TTS Pipeline not initialized"
    }))?;

    let request = optional_json::<SpeakRequest>(body)?.unwrap_or_default();
    let text = match request.text {
        Some(text) => text,
        None if tts_only => {
            return Err(ApiError::BadRequest(
                "Missing 'text' in request body".to_string(),
            ));
        }
        None => state.session.lock().await.word().as_string(),
    };

    let base_url = state.base_url(&headers);
    let spoken = speech.speak(&text, &base_url).await.map_err(|e| {
        let err = ApiError::from(e);
        if tts_only { err.on_tts_service() } else { err }
    })?;

    Ok(Json(spoken))
}

impl ApiState {
    /// Scheme and host generated URLs are rooted at
    ///
    /// Uses the configured public URL, falling back to the request's Host
    /// header.
    #[must_use]
    pub fn base_url(&self, headers: &HeaderMap) -> String {
        if let Some(url) = &self.public_url {
            return url.trim_end_matches('/').to_string();
        }

        let host = headers
            .get(header::HOST)
            .and_then(|h| h.to_str().ok())
            .unwrap_or("localhost");
        format!("http://{host}")
    }
}
