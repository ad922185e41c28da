//! Word buffer endpoints

use std::sync::Arc;

use axum::{
    Json, Router,
    body::Bytes,
    extract::{State, rejection::BytesRejection},
    routing::{get, post},
};
use serde::{Deserialize, Serialize};

use super::body::optional_json;
use super::{ApiError, ApiState};

/// Build word router
pub fn router(state: Arc<ApiState>) -> Router {
    Router::new()
        .route("/api/add_char", post(add_char))
        .route("/api/add_space", post(add_space))
        .route("/api/clear_word", post(clear_word))
        .route("/api/get_word", get(get_word))
        .with_state(state)
}

/// Add-character request
///
/// When `char` is absent, or the body is empty, the last detected letter is
/// used.
#[derive(Debug, Default, Deserialize)]
pub struct AddCharRequest {
    #[serde(rename = "char")]
    pub character: Option<String>,
}

/// Current word response
#[derive(Debug, Serialize)]
pub struct WordResponse {
    pub current_word: String,
}

/// Add-character response
#[derive(Debug, Serialize)]
pub struct AddCharResponse {
    pub current_word: String,
    pub added: String,
}

async fn add_char(
    State(state): State<Arc<ApiState>>,
    body: Result<Bytes, BytesRejection>,
) -> Result<Json<AddCharResponse>, ApiError> {
    let request = optional_json::<AddCharRequest>(body)?.unwrap_or_default();

    let mut session = state.session.lock().await;
    let added = session.add_char(request.character.as_deref());

    Ok(Json(AddCharResponse {
        current_word: session.word().as_string(),
        added,
    }))
}

async fn add_space(State(state): State<Arc<ApiState>>) -> Json<WordResponse> {
    let mut session = state.session.lock().await;
    session.add_space();

    Json(WordResponse {
        current_word: session.word().as_string(),
    })
}

async fn clear_word(State(state): State<Arc<ApiState>>) -> Json<WordResponse> {
    state.session.lock().await.clear();

    Json(WordResponse {
        current_word: String::new(),
    })
}

async fn get_word(State(state): State<Arc<ApiState>>) -> Json<WordResponse> {
    Json(WordResponse {
        current_word: state.session.lock().await.word().as_string(),
    })
}
