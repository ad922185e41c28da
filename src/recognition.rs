//! Frame-to-letter decision pipeline

use std::sync::Arc;

use serde::{Deserialize, Serialize};

use crate::vision::{self, CharacterClassifier, Frame, LandmarkDetector};
use crate::{Error, Result};

/// Minimum arg-max probability for a letter to be accepted (exclusive)
pub const CONFIDENCE_THRESHOLD: f64 = 0.8;

/// Letters the classifier's label indices map onto, in label order
pub const ALPHABET: &str = "ABCDEFGHIJKLMNOPQRSTUVWXYZ";

const LOW_CONFIDENCE: &str = "Low confidence";
const NO_FEATURES: &str = "No hand features extracted";
const NO_LANDMARKS: &str = "No landmarks detected";

/// Outcome of processing one frame
///
/// `confidence` is always the arg-max probability of the frame that produced
/// it, even when the letter was rejected.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct DetectionResult {
    #[serde(rename = "char")]
    pub character: String,
    pub confidence: f64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
}

impl DetectionResult {
    /// Empty result with zero confidence and no message
    #[must_use]
    pub fn empty() -> Self {
        Self::default()
    }

    fn rejected(confidence: f64, message: &str) -> Self {
        Self {
            character: String::new(),
            confidence,
            message: Some(message.to_string()),
        }
    }

    /// Result for a frame with no visible hand
    #[must_use]
    pub fn no_landmarks() -> Self {
        Self::rejected(0.0, NO_LANDMARKS)
    }

    /// Result for a hand that produced no feature values
    #[must_use]
    pub fn no_features() -> Self {
        Self::rejected(0.0, NO_FEATURES)
    }

    /// Whether a letter was accepted
    #[must_use]
    pub fn is_detected(&self) -> bool {
        !self.character.is_empty()
    }
}

/// Letter for a classifier label index
#[must_use]
pub fn label_for_index(index: usize) -> Option<char> {
    ALPHABET.chars().nth(index)
}

/// Apply the confidence threshold to a probability distribution
///
/// # Errors
///
/// Returns `Error::Inference` if the distribution is empty or its arg-max
/// falls outside the alphabet
pub fn decide(probabilities: &[f64], threshold: f64) -> Result<DetectionResult> {
    let (index, confidence) = probabilities
        .iter()
        .copied()
        .enumerate()
        .fold(None, |best: Option<(usize, f64)>, (i, p)| match best {
            Some((_, max)) if max >= p => best,
            _ => Some((i, p)),
        })
        .ok_or_else(|| Error::Inference("classifier returned no probabilities".to_string()))?;

    let letter = label_for_index(index).ok_or_else(|| {
        Error::Inference(format!(
            "label index {index} outside {}-letter alphabet",
            ALPHABET.len()
        ))
    })?;

    if confidence > threshold {
        Ok(DetectionResult {
            character: letter.to_string(),
            confidence,
            message: None,
        })
    } else {
        Ok(DetectionResult::rejected(confidence, LOW_CONFIDENCE))
    }
}

/// Runs detector, vectorizer, classifier and decision for one frame
pub struct Recognizer {
    detector: Arc<dyn LandmarkDetector>,
    classifier: Arc<dyn CharacterClassifier>,
    threshold: f64,
}

impl Recognizer {
    #[must_use]
    pub fn new(
        detector: Arc<dyn LandmarkDetector>,
        classifier: Arc<dyn CharacterClassifier>,
    ) -> Self {
        Self {
            detector,
            classifier,
            threshold: CONFIDENCE_THRESHOLD,
        }
    }

    /// Override the acceptance threshold
    #[must_use]
    pub const fn with_threshold(mut self, threshold: f64) -> Self {
        self.threshold = threshold;
        self
    }

    #[must_use]
    pub const fn threshold(&self) -> f64 {
        self.threshold
    }

    /// Recognize the letter shown in a frame
    ///
    /// # Errors
    ///
    /// Returns `Error::Inference` if detection or classification fails
    pub fn recognize(&self, frame: &Frame) -> Result<DetectionResult> {
        let hands = self.detector.detect(frame)?;
        if hands.is_empty() {
            return Ok(DetectionResult::no_landmarks());
        }

        let features = match vision::feature_vector(&hands) {
            Some(f) if !f.is_empty() => f,
            _ => return Ok(DetectionResult::no_features()),
        };

        let probabilities = self.classifier.classify(&features)?;
        let result = decide(&probabilities, self.threshold)?;

        tracing::debug!(
            char = %result.character,
            confidence = result.confidence,
            "frame classified"
        );

        Ok(result)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::vision::{HandLandmarks, LandmarkPoint};

    struct FixedDetector(Vec<HandLandmarks>);

    impl LandmarkDetector for FixedDetector {
        fn detect(&self, _frame: &Frame) -> Result<Vec<HandLandmarks>> {
            Ok(self.0.clone())
        }
    }

    struct FixedClassifier(Vec<f64>);

    impl CharacterClassifier for FixedClassifier {
        fn classify(&self, _features: &[f32]) -> Result<Vec<f64>> {
            Ok(self.0.clone())
        }
    }

    struct FailingClassifier;

    impl CharacterClassifier for FailingClassifier {
        fn classify(&self, _features: &[f32]) -> Result<Vec<f64>> {
            Err(Error::Inference("boom".to_string()))
        }
    }

    fn one_hot(index: usize, p: f64) -> Vec<f64> {
        let mut probs = vec![0.0; 26];
        probs[index] = p;
        probs
    }

    fn frame() -> Frame {
        Frame::from_rgb(1, 1, vec![0, 0, 0]).unwrap()
    }

    fn hand() -> HandLandmarks {
        HandLandmarks::new(vec![LandmarkPoint::new(0.5, 0.5, 0.0); 21])
    }

    #[test]
    fn threshold_is_strict() {
        let at = decide(&one_hot(0, 0.8), CONFIDENCE_THRESHOLD).unwrap();
        assert_eq!(at.character, "");
        assert!((at.confidence - 0.8).abs() < f64::EPSILON);
        assert_eq!(at.message.as_deref(), Some("Low confidence"));

        let above = decide(&one_hot(0, 0.800_000_1), CONFIDENCE_THRESHOLD).unwrap();
        assert_eq!(above.character, "A");
        assert!(above.message.is_none());
    }

    #[test]
    fn index_maps_to_contiguous_alphabet() {
        for (i, expected) in ALPHABET.chars().enumerate() {
            let result = decide(&one_hot(i, 0.99), CONFIDENCE_THRESHOLD).unwrap();
            assert_eq!(result.character, expected.to_string());
            assert_eq!(label_for_index(i), char::from_u32(65 + u32::try_from(i).unwrap()));
        }
    }

    #[test]
    fn argmax_picks_highest_probability() {
        let mut probs = vec![0.01; 26];
        probs[4] = 0.95;
        let result = decide(&probs, CONFIDENCE_THRESHOLD).unwrap();
        assert_eq!(result.character, "E");
        assert!((result.confidence - 0.95).abs() < f64::EPSILON);
    }

    #[test]
    fn empty_distribution_is_inference_error() {
        assert!(matches!(
            decide(&[], CONFIDENCE_THRESHOLD),
            Err(Error::Inference(_))
        ));
    }

    #[test]
    fn index_outside_alphabet_is_inference_error() {
        let mut probs = vec![0.0; 30];
        probs[28] = 0.99;
        assert!(matches!(
            decide(&probs, CONFIDENCE_THRESHOLD),
            Err(Error::Inference(_))
        ));
    }

    #[test]
    fn recognize_without_hand() {
        let recognizer = Recognizer::new(
            Arc::new(FixedDetector(vec![])),
            Arc::new(FixedClassifier(one_hot(0, 1.0))),
        );
        let result = recognizer.recognize(&frame()).unwrap();
        assert_eq!(result, DetectionResult::no_landmarks());
    }

    #[test]
    fn recognize_hand_without_points() {
        let recognizer = Recognizer::new(
            Arc::new(FixedDetector(vec![HandLandmarks::default()])),
            Arc::new(FixedClassifier(one_hot(0, 1.0))),
        );
        let result = recognizer.recognize(&frame()).unwrap();
        assert_eq!(result, DetectionResult::no_features());
    }

    #[test]
    fn recognize_accepted_letter() {
        let recognizer = Recognizer::new(
            Arc::new(FixedDetector(vec![hand()])),
            Arc::new(FixedClassifier(one_hot(7, 0.9))),
        );
        let result = recognizer.recognize(&frame()).unwrap();
        assert_eq!(result.character, "H");
        assert!(result.is_detected());
    }

    #[test]
    fn custom_threshold_applies() {
        let recognizer = Recognizer::new(
            Arc::new(FixedDetector(vec![hand()])),
            Arc::new(FixedClassifier(one_hot(7, 0.9))),
        )
        .with_threshold(0.95);
        let result = recognizer.recognize(&frame()).unwrap();
        assert!(!result.is_detected());
        assert_eq!(result.message.as_deref(), Some("Low confidence"));
    }

    #[test]
    fn classifier_failure_propagates() {
        let recognizer = Recognizer::new(
            Arc::new(FixedDetector(vec![hand()])),
            Arc::new(FailingClassifier),
        );
        assert!(recognizer.recognize(&frame()).is_err());
    }

    #[test]
    fn serializes_with_char_key() {
        let json = serde_json::to_value(DetectionResult::no_landmarks()).unwrap();
        assert_eq!(
            json,
            serde_json::json!({"char": "", "confidence": 0.0, "message": "No landmarks detected"})
        );

        let json = serde_json::to_value(DetectionResult::empty()).unwrap();
        assert_eq!(json, serde_json::json!({"char": "", "confidence": 0.0}));
    }
}
