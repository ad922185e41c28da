//! Vision processing
//!
//! Turns camera frames into hand landmarks and landmarks into letter
//! probabilities. The models themselves sit behind [`LandmarkDetector`] and
//! [`CharacterClassifier`] so the pipeline can run against test doubles.

mod features;
mod frame;
#[cfg(feature = "onnx")]
pub mod onnx;

pub use features::feature_vector;
pub use frame::{Frame, decode_data_url};

use crate::Result;

/// Number of landmark points in the MediaPipe hand model
pub const HAND_LANDMARK_COUNT: usize = 21;

/// One normalized hand keypoint
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LandmarkPoint {
    pub x: f32,
    pub y: f32,
    pub z: f32,
}

impl LandmarkPoint {
    #[must_use]
    pub const fn new(x: f32, y: f32, z: f32) -> Self {
        Self { x, y, z }
    }
}

/// Ordered landmark points of one detected hand
#[derive(Debug, Clone, Default, PartialEq)]
pub struct HandLandmarks {
    pub points: Vec<LandmarkPoint>,
}

impl HandLandmarks {
    #[must_use]
    pub const fn new(points: Vec<LandmarkPoint>) -> Self {
        Self { points }
    }
}

/// Locates hands in a frame
pub trait LandmarkDetector: Send + Sync {
    /// Detect hands in a BGR frame
    ///
    /// Returns an empty list when no hand is visible.
    ///
    /// # Errors
    ///
    /// Returns error if the underlying model fails
    fn detect(&self, frame: &Frame) -> Result<Vec<HandLandmarks>>;
}

/// Maps a feature vector to a probability per alphabet letter
pub trait CharacterClassifier: Send + Sync {
    /// Classify one feature vector
    ///
    /// # Errors
    ///
    /// Returns error if the underlying model fails
    fn classify(&self, features: &[f32]) -> Result<Vec<f64>>;
}
