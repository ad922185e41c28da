//! ONNX Runtime backends for hand landmarks and letter classification
//!
//! The landmarker expects a MediaPipe-style single-hand landmark model:
//! one `[1, N, N, 3]` RGB input in `[0, 1]`, a first output holding
//! `21 * 3` landmark coordinates in input pixels and a second output holding
//! the hand presence score. The classifier expects a `[1, 63]` input and a
//! `[1, labels]` softmax output.
//!
//! There is no palm-detection stage. The whole frame is resized into the
//! landmark model, so the hand should fill most of the frame (the browser
//! frontend frames the signer's hand). Wide shots with a small hand give
//! poor landmarks; run a palm detector upstream and implement
//! [`LandmarkDetector`] over the crop in that case.

use std::path::Path;
use std::sync::Mutex;

use image::RgbImage;
use image::imageops::{self, FilterType};
use ort::session::Session;
use ort::session::builder::GraphOptimizationLevel;
use ort::value::Tensor;

use super::{CharacterClassifier, Frame, HandLandmarks, LandmarkDetector, LandmarkPoint};
use crate::{Error, Result};

/// Intra-op threads per session
const INTRA_THREADS: usize = 2;

fn load_session(path: &Path) -> Result<Session> {
    if !path.exists() {
        return Err(Error::Initialization(format!(
            "model file not found: {}",
            path.display()
        )));
    }

    let init = |e: ort::Error| Error::Initialization(e.to_string());
    let session = Session::builder()
        .map_err(init)?
        .with_optimization_level(GraphOptimizationLevel::Level3)
        .map_err(init)?
        .with_intra_threads(INTRA_THREADS)
        .map_err(init)?
        .commit_from_file(path)
        .map_err(init)?;

    tracing::info!(
        path = %path.display(),
        inputs = session.inputs.len(),
        outputs = session.outputs.len(),
        "loaded ONNX model"
    );

    Ok(session)
}

fn first_input_name(session: &Session) -> Result<String> {
    session
        .inputs
        .first()
        .map(|i| i.name.clone())
        .ok_or_else(|| Error::Initialization("model declares no inputs".to_string()))
}

fn output_names(session: &Session) -> Vec<String> {
    session.outputs.iter().map(|o| o.name.clone()).collect()
}

fn inference(e: impl std::fmt::Display) -> Error {
    Error::Inference(e.to_string())
}

/// Single-hand landmark model
pub struct OnnxHandLandmarker {
    session: Mutex<Session>,
    input_name: String,
    landmarks_output: String,
    presence_output: Option<String>,
    input_size: u32,
    min_detection_confidence: f32,
}

impl OnnxHandLandmarker {
    /// Load the landmark model
    ///
    /// # Errors
    ///
    /// Returns `Error::Initialization` if the file is missing or not a
    /// usable model
    pub fn load(path: &Path, input_size: u32, min_detection_confidence: f32) -> Result<Self> {
        let session = load_session(path)?;
        let input_name = first_input_name(&session)?;
        let mut outputs = output_names(&session).into_iter();
        let landmarks_output = outputs
            .next()
            .ok_or_else(|| Error::Initialization("landmark model declares no outputs".to_string()))?;
        let presence_output = outputs.next();

        Ok(Self {
            session: Mutex::new(session),
            input_name,
            landmarks_output,
            presence_output,
            input_size,
            min_detection_confidence,
        })
    }

    fn prepare(&self, frame: &Frame) -> Result<Vec<f32>> {
        let rgb = RgbImage::from_raw(frame.width, frame.height, frame.to_rgb())
            .ok_or_else(|| Error::Inference("frame buffer does not match dimensions".to_string()))?;
        let resized = imageops::resize(&rgb, self.input_size, self.input_size, FilterType::Triangle);
        Ok(resized
            .into_raw()
            .into_iter()
            .map(|v| f32::from(v) / 255.0)
            .collect())
    }
}

impl LandmarkDetector for OnnxHandLandmarker {
    fn detect(&self, frame: &Frame) -> Result<Vec<HandLandmarks>> {
        let size = self.input_size as usize;
        let input = Tensor::from_array(([1usize, size, size, 3], self.prepare(frame)?))
            .map_err(inference)?;

        let mut session = self
            .session
            .lock()
            .map_err(|_| Error::Inference("landmark session poisoned".to_string()))?;
        let outputs = session
            .run(ort::inputs![self.input_name.as_str() => input])
            .map_err(inference)?;

        if let Some(name) = &self.presence_output {
            let presence = outputs
                .get(name.as_str())
                .ok_or_else(|| Error::Inference(format!("missing output '{name}'")))?;
            let (_, score) = presence.try_extract_tensor::<f32>().map_err(inference)?;
            let score = score.first().copied().unwrap_or_default();
            if score < self.min_detection_confidence {
                tracing::trace!(score, "no hand above detection confidence");
                return Ok(Vec::new());
            }
        }

        let landmarks = outputs
            .get(self.landmarks_output.as_str())
            .ok_or_else(|| Error::Inference(format!("missing output '{}'", self.landmarks_output)))?;
        let (_, coords) = landmarks.try_extract_tensor::<f32>().map_err(inference)?;

        #[allow(clippy::cast_precision_loss)]
        let scale = self.input_size as f32;
        let points = coords
            .chunks_exact(3)
            .map(|c| LandmarkPoint::new(c[0] / scale, c[1] / scale, c[2] / scale))
            .collect();

        Ok(vec![HandLandmarks::new(points)])
    }
}

/// Letter classifier over flattened landmarks
pub struct OnnxCharacterClassifier {
    session: Mutex<Session>,
    input_name: String,
    output_name: String,
}

impl OnnxCharacterClassifier {
    /// Load the classifier model
    ///
    /// # Errors
    ///
    /// Returns `Error::Initialization` if the file is missing or not a
    /// usable model
    pub fn load(path: &Path) -> Result<Self> {
        let session = load_session(path)?;
        let input_name = first_input_name(&session)?;
        let output_name = output_names(&session)
            .into_iter()
            .next()
            .ok_or_else(|| Error::Initialization("classifier declares no outputs".to_string()))?;

        Ok(Self {
            session: Mutex::new(session),
            input_name,
            output_name,
        })
    }
}

impl CharacterClassifier for OnnxCharacterClassifier {
    fn classify(&self, features: &[f32]) -> Result<Vec<f64>> {
        let input =
            Tensor::from_array(([1usize, features.len()], features.to_vec())).map_err(inference)?;

        let mut session = self
            .session
            .lock()
            .map_err(|_| Error::Inference("classifier session poisoned".to_string()))?;
        let outputs = session
            .run(ort::inputs![self.input_name.as_str() => input])
            .map_err(inference)?;

        let output = outputs
            .get(self.output_name.as_str())
            .ok_or_else(|| Error::Inference(format!("missing output '{}'", self.output_name)))?;
        let (_, probabilities) = output.try_extract_tensor::<f32>().map_err(inference)?;

        Ok(probabilities.iter().copied().map(f64::from).collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn missing_model_file_is_initialization_error() {
        let dir = tempfile::tempdir().unwrap();

        let landmarker = OnnxHandLandmarker::load(&dir.path().join("hand.onnx"), 224, 0.7);
        assert!(
            matches!(landmarker, Err(Error::Initialization(ref m)) if m.starts_with("model file not found"))
        );

        let classifier = OnnxCharacterClassifier::load(&dir.path().join("letters.onnx"));
        assert!(matches!(classifier, Err(Error::Initialization(_))));
    }
}
