//! Optional JSON request bodies

use axum::body::Bytes;
use axum::extract::rejection::BytesRejection;
use serde::de::DeserializeOwned;

use super::ApiError;

/// Parse a body that may be omitted
///
/// A missing or blank body is `None`. Anything else must be valid JSON for
/// `T`; a body that could not be read keeps the rejection's status.
pub fn optional_json<T: DeserializeOwned>(
    body: Result<Bytes, BytesRejection>,
) -> Result<Option<T>, ApiError> {
    let bytes = body?;
    if bytes.iter().all(u8::is_ascii_whitespace) {
        return Ok(None);
    }

    serde_json::from_slice(&bytes)
        .map(Some)
        .map_err(|e| ApiError::BadRequest(format!("Invalid JSON body: {e}")))
}
