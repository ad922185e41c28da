//! OpenAI-compatible speech endpoint
//!
//! Speaks the `POST /audio/speech` protocol with `response_format: "pcm"`,
//! which both `OpenAI` and Kokoro-FastAPI implement. The response body is
//! signed 16-bit little-endian mono PCM; every body chunk received becomes one
//! [`AudioChunk`].

use async_trait::async_trait;
use futures::StreamExt;

use super::{AudioChunk, SpeechSynthesizer};
use crate::{Error, Result};

/// Default Kokoro-FastAPI base URL
pub const DEFAULT_BASE_URL: &str = "http://localhost:8880/v1";

/// Default model name
pub const DEFAULT_MODEL: &str = "kokoro";

/// Synthesizes speech through an OpenAI-compatible HTTP API
pub struct OpenAiSpeech {
    client: reqwest::Client,
    endpoint: String,
    api_key: Option<String>,
    model: String,
    lang_code: Option<String>,
}

impl OpenAiSpeech {
    /// Create a client for `base_url` (e.g. `http://localhost:8880/v1`)
    ///
    /// # Errors
    ///
    /// Returns `Error::Initialization` if the base URL is not a valid HTTP URL
    pub fn new(base_url: &str, model: impl Into<String>) -> Result<Self> {
        let parsed = reqwest::Url::parse(base_url)
            .map_err(|e| Error::Initialization(format!("invalid TTS URL '{base_url}': {e}")))?;
        if !matches!(parsed.scheme(), "http" | "https") {
            return Err(Error::Initialization(format!(
                "TTS URL must be http or https: {base_url}"
            )));
        }

        Ok(Self {
            client: reqwest::Client::new(),
            endpoint: format!("{}/audio/speech", base_url.trim_end_matches('/')),
            api_key: None,
            model: model.into(),
            lang_code: None,
        })
    }

    /// Send a bearer token with each request
    #[must_use]
    pub fn with_api_key(mut self, key: Option<String>) -> Self {
        self.api_key = key.filter(|k| !k.is_empty());
        self
    }

    /// Kokoro language code (e.g. "a" for American English)
    #[must_use]
    pub fn with_lang_code(mut self, code: Option<String>) -> Self {
        self.lang_code = code.filter(|c| !c.is_empty());
        self
    }

    #[must_use]
    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }
}

#[async_trait]
impl SpeechSynthesizer for OpenAiSpeech {
    async fn synthesize(&self, text: &str, voice: &str) -> Result<Vec<AudioChunk>> {
        #[derive(serde::Serialize)]
        struct SpeechRequest<'a> {
            model: &'a str,
            input: &'a str,
            voice: &'a str,
            response_format: &'a str,
            #[serde(skip_serializing_if = "Option::is_none")]
            lang_code: Option<&'a str>,
        }

        let request = SpeechRequest {
            model: &self.model,
            input: text,
            voice,
            response_format: "pcm",
            lang_code: self.lang_code.as_deref(),
        };

        let mut builder = self.client.post(&self.endpoint).json(&request);
        if let Some(key) = &self.api_key {
            builder = builder.bearer_auth(key);
        }

        let response = builder
            .send()
            .await
            .map_err(|e| Error::Synthesis(e.to_string()))?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            return Err(Error::Synthesis(format!("TTS error {status}: {body}")));
        }

        let mut decoder = PcmDecoder::default();
        let mut chunks = Vec::new();
        let mut stream = response.bytes_stream();
        while let Some(item) = stream.next().await {
            let bytes = item.map_err(|e| Error::Synthesis(e.to_string()))?;
            chunks.push(decoder.decode(&bytes));
        }

        tracing::debug!(chunks = chunks.len(), "received PCM stream");
        Ok(chunks)
    }
}

/// Turns a byte stream of `s16le` into `f32` samples across chunk boundaries
#[derive(Debug, Default)]
struct PcmDecoder {
    pending: Option<u8>,
}

impl PcmDecoder {
    fn decode(&mut self, bytes: &[u8]) -> AudioChunk {
        let mut input = bytes;
        let mut samples = Vec::with_capacity(bytes.len() / 2 + 1);

        if let Some(low) = self.pending.take() {
            match input.split_first() {
                Some((&high, rest)) => {
                    samples.push(to_f32([low, high]));
                    input = rest;
                }
                None => {
                    self.pending = Some(low);
                    return samples;
                }
            }
        }

        let mut pairs = input.chunks_exact(2);
        for pair in pairs.by_ref() {
            samples.push(to_f32([pair[0], pair[1]]));
        }
        self.pending = pairs.remainder().first().copied();

        samples
    }
}

fn to_f32(bytes: [u8; 2]) -> f32 {
    f32::from(i16::from_le_bytes(bytes)) / 32768.0
}
