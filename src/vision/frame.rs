//! Frame decoding from browser data URLs

use base64::Engine as _;
use base64::engine::general_purpose::STANDARD;

use crate::{Error, Result};

/// A decoded camera frame with pixels in BGR order
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Frame {
    pub width: u32,
    pub height: u32,
    /// Row-major BGR bytes, `width * height * 3` long
    pub data: Vec<u8>,
}

impl Frame {
    /// Build a frame from row-major RGB bytes
    ///
    /// # Errors
    ///
    /// Returns error if the buffer length does not match the dimensions
    pub fn from_rgb(width: u32, height: u32, mut rgb: Vec<u8>) -> Result<Self> {
        check_len(width, height, rgb.len())?;
        swap_red_blue(&mut rgb);
        Ok(Self {
            width,
            height,
            data: rgb,
        })
    }

    /// Copy the pixels back into RGB order
    #[must_use]
    pub fn to_rgb(&self) -> Vec<u8> {
        let mut rgb = self.data.clone();
        swap_red_blue(&mut rgb);
        rgb
    }
}

/// Decode a `data:image/...;base64,<payload>` URL into a BGR frame
///
/// Everything up to the first comma is discarded.
///
/// # Errors
///
/// Returns `Error::Decode` if the URL has no payload, the payload is not
/// base64, or the bytes are not a supported image
pub fn decode_data_url(data_url: &str) -> Result<Frame> {
    let payload = data_url
        .split(',')
        .nth(1)
        .ok_or_else(|| Error::Decode("data URL has no payload".to_string()))?;

    let bytes = STANDARD
        .decode(payload.trim())
        .map_err(|e| Error::Decode(format!("invalid base64: {e}")))?;

    let image = image::load_from_memory(&bytes)
        .map_err(|e| Error::Decode(e.to_string()))?
        .to_rgb8();

    let (width, height) = image.dimensions();
    Frame::from_rgb(width, height, image.into_raw())
}

fn check_len(width: u32, height: u32, len: usize) -> Result<()> {
    let expected = width as usize * height as usize * 3;
    if len == expected {
        Ok(())
    } else {
        Err(Error::Decode(format!(
            "expected {expected} bytes for {width}x{height} frame, got {len}"
        )))
    }
}

fn swap_red_blue(pixels: &mut [u8]) {
    for px in pixels.chunks_exact_mut(3) {
        px.swap(0, 2);
    }
}
