//! Text-to-speech adapter
//!
//! The synthesizer itself is an external capability behind
//! [`SpeechSynthesizer`]. This module joins its chunks, writes the result to
//! disk and hands back a URL the same server can serve.

pub mod openai;
mod store;

pub use openai::OpenAiSpeech;
pub use store::{AudioStore, samples_to_wav};

use std::sync::Arc;

use async_trait::async_trait;
use serde::Serialize;

use crate::{Error, Result};

/// Sample rate of the Kokoro voices (24kHz)
pub const SAMPLE_RATE: u32 = 24_000;

/// Default Kokoro voice
pub const DEFAULT_VOICE: &str = "am_fenrir";

/// One contiguous block of samples in `[-1.0, 1.0]`
pub type AudioChunk = Vec<f32>;

/// Produces audio for a piece of text
#[async_trait]
pub trait SpeechSynthesizer: Send + Sync {
    /// Synthesize `text` with `voice`, returning chunks in playback order
    ///
    /// # Errors
    ///
    /// Returns error if the synthesizer fails
    async fn synthesize(&self, text: &str, voice: &str) -> Result<Vec<AudioChunk>>;
}

/// Join chunks in order, skipping empty ones
#[must_use]
pub fn concatenate(chunks: &[AudioChunk]) -> Vec<f32> {
    let total = chunks.iter().map(Vec::len).sum();
    let mut samples = Vec::with_capacity(total);
    for chunk in chunks.iter().filter(|c| !c.is_empty()) {
        samples.extend_from_slice(chunk);
    }
    samples
}

/// Result of a successful synthesis
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SpokenAudio {
    pub audio_url: String,
    pub text_spoken: String,
}

/// Synthesizer plus the place its output is written to
pub struct SpeechService {
    synthesizer: Arc<dyn SpeechSynthesizer>,
    voice: String,
    store: AudioStore,
}

impl SpeechService {
    #[must_use]
    pub fn new(synthesizer: Arc<dyn SpeechSynthesizer>, store: AudioStore) -> Self {
        Self {
            synthesizer,
            voice: DEFAULT_VOICE.to_string(),
            store,
        }
    }

    /// Set the voice identifier passed to the synthesizer
    #[must_use]
    pub fn with_voice(mut self, voice: impl Into<String>) -> Self {
        self.voice = voice.into();
        self
    }

    #[must_use]
    pub const fn store(&self) -> &AudioStore {
        &self.store
    }

    #[must_use]
    pub fn synthesizer(&self) -> &dyn SpeechSynthesizer {
        self.synthesizer.as_ref()
    }

    #[must_use]
    pub fn voice(&self) -> &str {
        &self.voice
    }

    /// Speak `text` and persist the audio
    ///
    /// `base_url` is the scheme and host the returned URL is rooted at.
    ///
    /// # Errors
    ///
    /// Returns `Error::InvalidInput` if the trimmed text is empty,
    /// `Error::SynthesisEmpty` if the synthesizer produced no samples, and
    /// the synthesizer's or store's error otherwise
    pub async fn speak(&self, text: &str, base_url: &str) -> Result<SpokenAudio> {
        let text = text.trim();
        if text.is_empty() {
            return Err(Error::InvalidInput("No text to speak".to_string()));
        }

        tracing::info!(text, voice = %self.voice, "generating audio");
        let chunks = self.synthesizer.synthesize(text, &self.voice).await?;

        let samples = concatenate(&chunks);
        if samples.is_empty() {
            return Err(Error::SynthesisEmpty);
        }

        let filename = self.store.save(&samples).await?;
        let audio_url = self.store.url_for(base_url, &filename);
        tracing::info!(
            path = %self.store.dir().join(&filename).display(),
            url = %audio_url,
            samples = samples.len(),
            "audio saved"
        );

        Ok(SpokenAudio {
            audio_url,
            text_spoken: text.to_string(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    struct FixedSynth(Vec<AudioChunk>);

    #[async_trait]
    impl SpeechSynthesizer for FixedSynth {
        async fn synthesize(&self, _text: &str, _voice: &str) -> Result<Vec<AudioChunk>> {
            Ok(self.0.clone())
        }
    }

    fn service(chunks: Vec<AudioChunk>, dir: &std::path::Path) -> SpeechService {
        SpeechService::new(
            Arc::new(FixedSynth(chunks)),
            AudioStore::new(dir, "static_audio", "speech_", SAMPLE_RATE),
        )
    }

    #[test]
    fn concatenate_preserves_order() {
        let chunks = vec![vec![0.1, 0.2], vec![], vec![0.3]];
        assert_eq!(concatenate(&chunks), vec![0.1, 0.2, 0.3]);
    }

    #[test]
    fn concatenated_length_grows_with_chunks() {
        let mut chunks: Vec<AudioChunk> = Vec::new();
        let mut previous = 0;
        for n in 0..5 {
            chunks.push(vec![0.5; n]);
            let len = concatenate(&chunks).len();
            assert!(len >= previous);
            previous = len;
        }
        assert_eq!(previous, 10);
    }

    #[tokio::test]
    async fn empty_text_is_invalid_input() {
        let dir = tempfile::tempdir().unwrap();
        let svc = service(vec![vec![0.1]], dir.path());

        let err = svc.speak("   ", "http://localhost:5000").await.unwrap_err();
        assert!(matches!(err, Error::InvalidInput(_)));
        assert_eq!(std::fs::read_dir(dir.path()).unwrap().count(), 0);
    }

    #[tokio::test]
    async fn empty_chunks_are_synthesis_empty() {
        let dir = tempfile::tempdir().unwrap();
        let svc = service(vec![vec![], vec![]], dir.path());

        let err = svc.speak("hi", "http://localhost:5000").await.unwrap_err();
        assert!(matches!(err, Error::SynthesisEmpty));
    }

    #[tokio::test]
    async fn speak_writes_wav_and_builds_url() {
        let dir = tempfile::tempdir().unwrap();
        let svc = service(vec![vec![0.0; 100], vec![0.5; 20]], dir.path());

        let spoken = svc.speak("  hello  ", "http://localhost:5000/").await.unwrap();
        assert_eq!(spoken.text_spoken, "hello");
        assert!(spoken.audio_url.starts_with("http://localhost:5000/static_audio/speech_"));
        assert!(spoken.audio_url.ends_with(".wav"));

        let filename = spoken.audio_url.rsplit('/').next().unwrap();
        let reader = hound::WavReader::open(dir.path().join(filename)).unwrap();
        assert_eq!(reader.spec().sample_rate, SAMPLE_RATE);
        assert_eq!(reader.len(), 120);
    }
}
