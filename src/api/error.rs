//! HTTP error responses

use axum::{
    Json,
    extract::rejection::BytesRejection,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde::Serialize;

use crate::Error;

/// Errors returned by API handlers
#[derive(Debug)]
pub enum ApiError {
    /// A model, tracker or synthesizer failed to load at startup
    NotInitialized(&'static str),
    BadRequest(String),
    /// The body could not be read, e.g. it exceeded the size limit
    Rejected(StatusCode, String),
    Decode(String),
    Inference(String),
    SynthesisEmpty(String),
    SynthesisFailed(String),
    Internal(String),
}

impl ApiError {
    /// Reword speech failures the way the standalone TTS service reports them
    #[must_use]
    pub fn on_tts_service(self) -> Self {
        match self {
            Self::SynthesisEmpty(_) => {
                Self::SynthesisEmpty("TTS generated no audio on TTS Service".to_string())
            }
            Self::SynthesisFailed(msg) => Self::SynthesisFailed(format!("TTS Service: {msg}")),
            other => other,
        }
    }
}

impl From<BytesRejection> for ApiError {
    fn from(rejection: BytesRejection) -> Self {
        Self::Rejected(rejection.status(), rejection.body_text())
    }
}

impl From<Error> for ApiError {
    fn from(err: Error) -> Self {
        match err {
            Error::InvalidInput(msg) => Self::BadRequest(msg),
            Error::Decode(msg) => Self::Decode(msg),
            Error::Inference(msg) => Self::Inference(msg),
            Error::SynthesisEmpty => Self::SynthesisEmpty("TTS generated no audio".to_string()),
            Error::Synthesis(msg) => Self::SynthesisFailed(format!("Error generating audio: {msg}")),
            other => Self::Internal(other.to_string()),
        }
    }
}

#[derive(Serialize)]
struct ErrorBody {
    error: String,
    code: &'static str,
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, code, message) = match self {
            Self::NotInitialized(msg) => (
                StatusCode::INTERNAL_SERVER_ERROR,
                "not_initialized",
                msg.to_string(),
            ),
            Self::BadRequest(msg) => (StatusCode::BAD_REQUEST, "invalid_input", msg),
            Self::Rejected(status, msg) => {
                let code = if status == StatusCode::PAYLOAD_TOO_LARGE {
                    "payload_too_large"
                } else {
                    "invalid_request"
                };
                (status, code, msg)
            }
            Self::Decode(msg) => (
                StatusCode::BAD_REQUEST,
                "decode_failed",
                format!("Error decoding image: {msg}"),
            ),
            Self::Inference(msg) => (
                StatusCode::INTERNAL_SERVER_ERROR,
                "inference_failed",
                format!("Error during model prediction: {msg}"),
            ),
            Self::SynthesisEmpty(msg) => {
                (StatusCode::INTERNAL_SERVER_ERROR, "synthesis_empty", msg)
            }
            Self::SynthesisFailed(msg) => {
                (StatusCode::INTERNAL_SERVER_ERROR, "synthesis_failed", msg)
            }
            Self::Internal(msg) => (StatusCode::INTERNAL_SERVER_ERROR, "internal", msg),
        };

        if status.is_server_error() {
            tracing::error!(code, error = %message, "request failed");
        }

        (
            status,
            Json(ErrorBody {
                error: message,
                code,
            }),
        )
            .into_response()
    }
}
