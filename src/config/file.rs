//! TOML configuration file loading
//!
//! Supports `~/.config/fingerspell/config.toml` as a persistent config source.
//! All fields are optional; the file is a partial overlay on top of defaults.

use std::path::{Path, PathBuf};

use serde::Deserialize;

use crate::Result;

/// Top-level TOML configuration file schema
#[derive(Debug, Default, Deserialize)]
pub struct ConfigFile {
    /// HTTP server configuration
    #[serde(default)]
    pub server: ServerFileConfig,

    /// Landmark and classifier models
    #[serde(default)]
    pub vision: VisionFileConfig,

    /// Speech synthesis
    #[serde(default)]
    pub speech: SpeechFileConfig,
}

/// Server configuration
#[derive(Debug, Default, Deserialize)]
pub struct ServerFileConfig {
    /// Route set to serve ("combined", "asl" or "tts")
    pub surface: Option<String>,

    /// Port to listen on
    pub port: Option<u16>,

    /// Bind address
    pub bind: Option<String>,

    /// Base URL used in generated audio links instead of the Host header
    pub public_url: Option<String>,

    /// Web UI directory
    pub static_dir: Option<PathBuf>,

    /// Largest accepted request body in bytes
    pub max_body_bytes: Option<usize>,
}

/// Vision model configuration
#[derive(Debug, Default, Deserialize)]
pub struct VisionFileConfig {
    pub landmark_model: Option<PathBuf>,
    pub classifier_model: Option<PathBuf>,
    pub min_detection_confidence: Option<f32>,
    pub confidence_threshold: Option<f64>,
    pub input_size: Option<u32>,
}

/// Speech synthesis configuration
#[derive(Debug, Default, Deserialize)]
pub struct SpeechFileConfig {
    /// OpenAI-compatible API base URL
    pub base_url: Option<String>,
    pub api_key: Option<String>,
    pub model: Option<String>,
    pub voice: Option<String>,
    pub lang_code: Option<String>,
    pub sample_rate: Option<u32>,
    /// Where generated WAV files are written
    pub audio_dir: Option<PathBuf>,
}

/// Load the TOML config file from the standard path
///
/// Returns `ConfigFile::default()` if the file doesn't exist or can't be parsed.
pub fn load_config_file() -> ConfigFile {
    let Some(path) = config_file_path() else {
        return ConfigFile::default();
    };

    if !path.exists() {
        return ConfigFile::default();
    }

    match read_config_file(&path) {
        Ok(config) => config,
        Err(e) => {
            tracing::warn!(
                path = %path.display(),
                error = %e,
                "failed to load config file, using defaults"
            );
            ConfigFile::default()
        }
    }
}

/// Read and parse a specific config file
///
/// # Errors
///
/// Returns error if the file cannot be read or is not valid TOML
pub fn read_config_file(path: &Path) -> Result<ConfigFile> {
    let content = std::fs::read_to_string(path)?;
    let config = toml::from_str(&content)?;
    tracing::info!(path = %path.display(), "loaded config file");
    Ok(config)
}

/// Return the config file path: `~/.config/fingerspell/config.toml`
pub fn config_file_path() -> Option<PathBuf> {
    directories::BaseDirs::new().map(|d| d.config_dir().join("fingerspell").join("config.toml"))
}
