//! Error types for the fingerspell gateway

use thiserror::Error;

/// Result type alias for gateway operations
pub type Result<T> = std::result::Result<T, Error>;

/// Errors that can occur in the fingerspell gateway
#[derive(Debug, Error)]
pub enum Error {
    /// Configuration error
    #[error("configuration error: {0}")]
    Config(String),

    /// A model, tracker or synthesizer failed to load
    #[error("initialization error: {0}")]
    Initialization(String),

    /// Missing or malformed request input
    #[error("invalid input: {0}")]
    InvalidInput(String),

    /// Image bytes could not be interpreted
    #[error("decode error: {0}")]
    Decode(String),

    /// Landmark detection or classification failed
    #[error("inference error: {0}")]
    Inference(String),

    /// Speech synthesizer failed
    #[error("synthesis error: {0}")]
    Synthesis(String),

    /// Speech synthesizer produced no samples
    #[error("synthesizer produced no audio")]
    SynthesisEmpty,

    /// Audio encoding error
    #[error("audio error: {0}")]
    Audio(String),

    /// IO error
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),

    /// HTTP error
    #[error("http error: {0}")]
    Http(#[from] reqwest::Error),

    /// Serialization error
    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// TOML parsing error
    #[error("toml error: {0}")]
    Toml(#[from] toml::de::Error),
}
