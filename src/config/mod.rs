//! Configuration management for the fingerspell gateway
//!
//! Values are layered: built-in defaults, then the TOML file, then
//! environment variables, then command-line flags.

pub mod file;

use std::fmt;
use std::path::PathBuf;
use std::str::FromStr;

pub use file::{ConfigFile, config_file_path, load_config_file, read_config_file};

use crate::recognition::CONFIDENCE_THRESHOLD;
use crate::speech::{self, openai};
use crate::{Error, Result};

/// Default bind address (all interfaces)
pub const DEFAULT_BIND: &str = "0.0.0.0";

/// Default request body limit, sized for base64 camera frames (16 MiB)
pub const DEFAULT_BODY_LIMIT: usize = 16 * 1024 * 1024;

/// Which set of routes a process serves
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Surface {
    /// Recognition, word buffer and speech in one process
    #[default]
    Combined,
    /// Recognition and word buffer only
    Asl,
    /// Speech only
    Tts,
}

impl Surface {
    #[must_use]
    pub const fn default_port(self) -> u16 {
        match self {
            Self::Combined | Self::Asl => 5000,
            Self::Tts => 5001,
        }
    }

    /// URL path segment generated audio is served under
    #[must_use]
    pub const fn audio_route(self) -> &'static str {
        match self {
            Self::Combined | Self::Asl => "static_audio",
            Self::Tts => "static_audio_tts_service",
        }
    }

    /// Filename prefix of generated audio
    #[must_use]
    pub const fn file_prefix(self) -> &'static str {
        match self {
            Self::Combined | Self::Asl => "speech_",
            Self::Tts => "speech_tts_service_",
        }
    }

    /// Banner served at `GET /`; the speech-only surface has none
    #[must_use]
    pub const fn root_message(self) -> Option<&'static str> {
        match self {
            Self::Combined => Some("ASL Translator Backend is running!"),
            Self::Asl => Some("ASL Recognition Backend is running!"),
            Self::Tts => None,
        }
    }

    #[must_use]
    pub const fn serves_recognition(self) -> bool {
        matches!(self, Self::Combined | Self::Asl)
    }

    #[must_use]
    pub const fn serves_speech(self) -> bool {
        matches!(self, Self::Combined | Self::Tts)
    }
}

impl FromStr for Surface {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "combined" | "all" => Ok(Self::Combined),
            "asl" => Ok(Self::Asl),
            "tts" => Ok(Self::Tts),
            other => Err(Error::Config(format!(
                "unknown surface '{other}' (expected combined, asl or tts)"
            ))),
        }
    }
}

impl fmt::Display for Surface {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Combined => "combined",
            Self::Asl => "asl",
            Self::Tts => "tts",
        })
    }
}

/// Gateway configuration
#[derive(Debug, Clone)]
pub struct Config {
    pub server: ServerConfig,
    pub vision: VisionConfig,
    pub speech: SpeechConfig,
}

/// HTTP server configuration
#[derive(Debug, Clone)]
pub struct ServerConfig {
    pub surface: Surface,
    pub port: u16,
    pub bind: String,

    /// Base URL for generated audio links; the request's Host header is used
    /// when unset
    pub public_url: Option<String>,

    /// Web UI directory served as the router fallback
    pub static_dir: Option<PathBuf>,

    /// Largest accepted request body in bytes
    pub max_body_bytes: usize,
}

/// Landmark detector and classifier configuration
#[derive(Debug, Clone)]
pub struct VisionConfig {
    pub landmark_model: PathBuf,
    pub classifier_model: PathBuf,

    /// Minimum hand presence score for the landmarker to report a hand
    pub min_detection_confidence: f32,

    /// Arg-max probability a letter must exceed to be accepted
    pub confidence_threshold: f64,

    /// Side length of the square landmarker input
    pub input_size: u32,
}

/// Speech synthesis configuration
#[derive(Debug, Clone)]
pub struct SpeechConfig {
    /// OpenAI-compatible API base URL
    pub base_url: String,
    pub api_key: Option<String>,
    pub model: String,
    pub voice: String,
    pub lang_code: Option<String>,
    pub sample_rate: u32,
    pub audio_dir: PathBuf,
}

/// Values given on the command line
#[derive(Debug, Clone, Default)]
pub struct Overrides {
    pub surface: Option<Surface>,
    pub port: Option<u16>,
    pub bind: Option<String>,
    pub config_path: Option<PathBuf>,
}

impl Config {
    /// Load configuration from the config file, process environment and
    /// command-line overrides
    ///
    /// # Errors
    ///
    /// Returns error if an explicit config file cannot be read or a value is
    /// invalid
    pub fn load(overrides: &Overrides) -> Result<Self> {
        let file = match &overrides.config_path {
            Some(path) => read_config_file(path)?,
            None => load_config_file(),
        };
        Self::from_sources(file, |key| std::env::var(key).ok(), overrides)
    }

    /// Build configuration from explicit sources
    ///
    /// # Errors
    ///
    /// Returns `Error::Config` if a value is invalid
    pub fn from_sources(
        file: ConfigFile,
        env: impl Fn(&str) -> Option<String>,
        overrides: &Overrides,
    ) -> Result<Self> {
        let surface = match overrides.surface {
            Some(s) => s,
            None => env("FINGERSPELL_SURFACE")
                .or(file.server.surface)
                .map(|s| s.parse::<Surface>())
                .transpose()?
                .unwrap_or_default(),
        };

        let port = match overrides.port {
            Some(p) => p,
            None => match env("FINGERSPELL_PORT") {
                Some(raw) => raw
                    .parse::<u16>()
                    .map_err(|e| Error::Config(format!("invalid FINGERSPELL_PORT '{raw}': {e}")))?,
                None => file.server.port.unwrap_or_else(|| surface.default_port()),
            },
        };

        let max_body_bytes = match env("FINGERSPELL_MAX_BODY_BYTES") {
            Some(raw) => raw.parse::<usize>().map_err(|e| {
                Error::Config(format!("invalid FINGERSPELL_MAX_BODY_BYTES '{raw}': {e}"))
            })?,
            None => file.server.max_body_bytes.unwrap_or(DEFAULT_BODY_LIMIT),
        };
        if max_body_bytes == 0 {
            return Err(Error::Config("server.max_body_bytes must be positive".to_string()));
        }

        let server = ServerConfig {
            surface,
            port,
            bind: overrides
                .bind
                .clone()
                .or_else(|| env("FINGERSPELL_BIND"))
                .or(file.server.bind)
                .unwrap_or_else(|| DEFAULT_BIND.to_string()),
            public_url: env("FINGERSPELL_PUBLIC_URL").or(file.server.public_url),
            static_dir: env("FINGERSPELL_STATIC_DIR")
                .map(PathBuf::from)
                .or(file.server.static_dir),
            max_body_bytes,
        };

        let vision = VisionConfig {
            landmark_model: env("FINGERSPELL_LANDMARK_MODEL")
                .map(PathBuf::from)
                .or(file.vision.landmark_model)
                .unwrap_or_else(|| PathBuf::from("hand_landmark.onnx")),
            classifier_model: env("FINGERSPELL_CLASSIFIER_MODEL")
                .map(PathBuf::from)
                .or(file.vision.classifier_model)
                .unwrap_or_else(|| PathBuf::from("asl_model.onnx")),
            min_detection_confidence: file.vision.min_detection_confidence.unwrap_or(0.7),
            confidence_threshold: file
                .vision
                .confidence_threshold
                .unwrap_or(CONFIDENCE_THRESHOLD),
            input_size: file.vision.input_size.unwrap_or(224),
        };

        if vision.input_size == 0 {
            return Err(Error::Config("vision.input_size must be positive".to_string()));
        }

        let sample_rate = file.speech.sample_rate.unwrap_or(speech::SAMPLE_RATE);
        if sample_rate == 0 {
            return Err(Error::Config("speech.sample_rate must be positive".to_string()));
        }

        let speech = SpeechConfig {
            base_url: env("FINGERSPELL_TTS_URL")
                .or(file.speech.base_url)
                .unwrap_or_else(|| openai::DEFAULT_BASE_URL.to_string()),
            api_key: env("FINGERSPELL_TTS_API_KEY")
                .or_else(|| env("OPENAI_API_KEY"))
                .or(file.speech.api_key),
            model: file
                .speech
                .model
                .unwrap_or_else(|| openai::DEFAULT_MODEL.to_string()),
            voice: env("FINGERSPELL_TTS_VOICE")
                .or(file.speech.voice)
                .unwrap_or_else(|| speech::DEFAULT_VOICE.to_string()),
            lang_code: Some(file.speech.lang_code.unwrap_or_else(|| "a".to_string())),
            sample_rate,
            audio_dir: env("FINGERSPELL_AUDIO_DIR")
                .map(PathBuf::from)
                .or(file.speech.audio_dir)
                .unwrap_or_else(|| PathBuf::from(surface.audio_route())),
        };

        Ok(Self {
            server,
            vision,
            speech,
        })
    }
}
