//! Shared test utilities

#![allow(dead_code)]

use std::io::Cursor;
use std::path::Path;
use std::sync::Arc;

use async_trait::async_trait;
use axum::{
    Router,
    body::Body,
    http::{Request, StatusCode},
};
use base64::Engine as _;
use base64::engine::general_purpose::STANDARD;
use fingerspell_gateway::{
    ApiServerBuilder, AudioChunk, AudioStore, CharacterClassifier, Error, Frame, HandLandmarks,
    LandmarkDetector, LandmarkPoint, Recognizer, Result, SpeechService, SpeechSynthesizer,
    Surface, vision,
};
use tower::ServiceExt;

/// Detector returning a fixed set of hands for every frame
pub struct StubDetector(pub Vec<HandLandmarks>);

impl LandmarkDetector for StubDetector {
    fn detect(&self, _frame: &Frame) -> Result<Vec<HandLandmarks>> {
        Ok(self.0.clone())
    }
}

/// Classifier returning a fixed distribution
pub struct StubClassifier(pub Vec<f64>);

impl CharacterClassifier for StubClassifier {
    fn classify(&self, _features: &[f32]) -> Result<Vec<f64>> {
        Ok(self.0.clone())
    }
}

/// Classifier that always fails
pub struct FailingClassifier;

impl CharacterClassifier for FailingClassifier {
    fn classify(&self, _features: &[f32]) -> Result<Vec<f64>> {
        Err(Error::Inference("model exploded".to_string()))
    }
}

/// Synthesizer returning fixed chunks
pub struct StubSynth(pub Vec<AudioChunk>);

#[async_trait]
impl SpeechSynthesizer for StubSynth {
    async fn synthesize(&self, _text: &str, _voice: &str) -> Result<Vec<AudioChunk>> {
        Ok(self.0.clone())
    }
}

/// Synthesizer that always fails
pub struct FailingSynth;

#[async_trait]
impl SpeechSynthesizer for FailingSynth {
    async fn synthesize(&self, _text: &str, _voice: &str) -> Result<Vec<AudioChunk>> {
        Err(Error::Synthesis("voice not found".to_string()))
    }
}

/// A full 21-point hand
#[must_use]
pub fn hand() -> HandLandmarks {
    HandLandmarks::new(vec![LandmarkPoint::new(0.5, 0.5, 0.0); vision::HAND_LANDMARK_COUNT])
}

/// 26-letter distribution with `p` at `index` and the rest spread evenly
#[must_use]
pub fn distribution(index: usize, p: f64) -> Vec<f64> {
    let rest = (1.0 - p) / 25.0;
    let mut probs = vec![rest; 26];
    probs[index] = p;
    probs
}

#[must_use]
pub fn recognizer(
    hands: Vec<HandLandmarks>,
    classifier: impl CharacterClassifier + 'static,
) -> Arc<Recognizer> {
    Arc::new(Recognizer::new(
        Arc::new(StubDetector(hands)),
        Arc::new(classifier),
    ))
}

#[must_use]
pub fn speech(
    synth: impl SpeechSynthesizer + 'static,
    dir: &Path,
    surface: Surface,
) -> Arc<SpeechService> {
    Arc::new(SpeechService::new(
        Arc::new(synth),
        AudioStore::new(dir, surface.audio_route(), surface.file_prefix(), 24_000),
    ))
}

/// Router with optional capabilities
#[must_use]
pub fn router(
    surface: Surface,
    recognizer: Option<Arc<Recognizer>>,
    speech: Option<Arc<SpeechService>>,
) -> Router {
    let mut builder = ApiServerBuilder::new(surface, surface.default_port());
    if let Some(r) = recognizer {
        builder = builder.recognizer(r);
    }
    if let Some(s) = speech {
        builder = builder.speech(s);
    }
    builder.build().router()
}

/// Small solid-color PNG as a data URL
#[must_use]
pub fn png_data_url() -> String {
    let image = image::RgbImage::from_pixel(8, 8, image::Rgb([200, 120, 80]));
    let mut cursor = Cursor::new(Vec::new());
    image
        .write_to(&mut cursor, image::ImageFormat::Png)
        .expect("failed to encode test PNG");
    format!("data:image/png;base64,{}", STANDARD.encode(cursor.into_inner()))
}

/// PNG of pseudo-random pixels, which does not compress
///
/// A 1000x1000 frame encodes to a data URL of roughly 4 MB.
#[must_use]
pub fn noise_png_data_url(width: u32, height: u32) -> String {
    let mut state: u64 = 0x9E37_79B9_7F4A_7C15;
    let image = image::RgbImage::from_fn(width, height, |_, _| {
        let mut channel = || {
            state ^= state << 13;
            state ^= state >> 7;
            state ^= state << 17;
            state.to_le_bytes()[3]
        };
        image::Rgb([channel(), channel(), channel()])
    });
    let mut cursor = Cursor::new(Vec::new());
    image
        .write_to(&mut cursor, image::ImageFormat::Png)
        .expect("failed to encode test PNG");
    format!("data:image/png;base64,{}", STANDARD.encode(cursor.into_inner()))
}

async fn send(app: &Router, request: Request<Body>) -> (StatusCode, serde_json::Value) {
    let response = app.clone().oneshot(request).await.unwrap();
    let status = response.status();
    let body = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    let json = serde_json::from_slice(&body).unwrap_or(serde_json::Value::Null);
    (status, json)
}

/// POST a JSON body
pub async fn post_json(
    app: &Router,
    uri: &str,
    body: &serde_json::Value,
) -> (StatusCode, serde_json::Value) {
    let request = Request::builder()
        .method("POST")
        .uri(uri)
        .header("content-type", "application/json")
        .header("host", "gateway.test:5000")
        .body(Body::from(body.to_string()))
        .unwrap();
    send(app, request).await
}

/// POST a raw body labelled as JSON
pub async fn post_raw(app: &Router, uri: &str, body: &str) -> (StatusCode, serde_json::Value) {
    let request = Request::builder()
        .method("POST")
        .uri(uri)
        .header("content-type", "application/json")
        .header("host", "gateway.test:5000")
        .body(Body::from(body.to_string()))
        .unwrap();
    send(app, request).await
}

/// POST with no body
pub async fn post_empty(app: &Router, uri: &str) -> (StatusCode, serde_json::Value) {
    let request = Request::builder()
        .method("POST")
        .uri(uri)
        .header("host", "gateway.test:5000")
        .body(Body::empty())
        .unwrap();
    send(app, request).await
}

/// GET and parse JSON
pub async fn get_json(app: &Router, uri: &str) -> (StatusCode, serde_json::Value) {
    let request = Request::builder().uri(uri).body(Body::empty()).unwrap();
    send(app, request).await
}

/// GET raw bytes
pub async fn get_bytes(app: &Router, uri: &str) -> (StatusCode, Vec<u8>) {
    let request = Request::builder().uri(uri).body(Body::empty()).unwrap();
    let response = app.clone().oneshot(request).await.unwrap();
    let status = response.status();
    let body = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    (status, body.to_vec())
}
