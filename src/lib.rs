//! Fingerspell Gateway - fingerspelling recognition and speech over HTTP
//!
//! This library glues three pretrained capabilities into one service:
//! - Hand landmark detection on camera frames
//! - Letter classification from flattened landmarks
//! - Text-to-speech for the spelled word
//!
//! # Architecture
//!
//! ```text
//! ┌──────────────────────────────────────────────────────┐
//! │                  Browser frontend                    │
//! └────────────────────────┬─────────────────────────────┘
//!                          │ JSON / WAV
//! ┌────────────────────────▼─────────────────────────────┐
//! │                  Fingerspell Gateway                 │
//! │  Frame decode │ Recognizer │ Session │ Speech store │
//! └────────────────────────┬─────────────────────────────┘
//!                          │
//! ┌────────────────────────▼─────────────────────────────┐
//! │   Landmark model  │  Letter classifier  │  TTS API   │
//! └──────────────────────────────────────────────────────┘
//! ```

pub mod api;
pub mod config;
pub mod daemon;
pub mod error;
pub mod recognition;
pub mod session;
pub mod speech;
pub mod vision;

pub use api::{ApiServer, ApiServerBuilder, ApiState};
pub use config::{Config, Surface};
pub use daemon::Daemon;
pub use error::{Error, Result};
pub use recognition::{CONFIDENCE_THRESHOLD, DetectionResult, Recognizer};
pub use session::{Session, WordBuffer};
pub use speech::{AudioChunk, AudioStore, SpeechService, SpeechSynthesizer, SpokenAudio};
pub use vision::{CharacterClassifier, Frame, HandLandmarks, LandmarkDetector, LandmarkPoint};
