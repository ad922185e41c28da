//! Startup wiring: load capabilities from config and serve them

use std::sync::Arc;

use crate::api::{ApiServer, ApiServerBuilder};
use crate::config::Config;
use crate::recognition::Recognizer;
use crate::speech::{AudioStore, OpenAiSpeech, SpeechService};
use crate::{Error, Result};

/// Gateway process
pub struct Daemon {
    config: Config,
}

impl Daemon {
    #[must_use]
    pub const fn new(config: Config) -> Self {
        Self { config }
    }

    /// Load the landmark and classifier models
    ///
    /// # Errors
    ///
    /// Returns `Error::Initialization` if either model cannot be loaded
    #[cfg(feature = "onnx")]
    pub fn init_recognizer(&self) -> Result<Recognizer> {
        use crate::vision::onnx::{OnnxCharacterClassifier, OnnxHandLandmarker};

        let vision = &self.config.vision;
        let detector = OnnxHandLandmarker::load(
            &vision.landmark_model,
            vision.input_size,
            vision.min_detection_confidence,
        )?;
        let classifier = OnnxCharacterClassifier::load(&vision.classifier_model)?;

        Ok(Recognizer::new(Arc::new(detector), Arc::new(classifier))
            .with_threshold(vision.confidence_threshold))
    }

    /// Load the landmark and classifier models
    ///
    /// # Errors
    ///
    /// Always fails: no inference backend is compiled in
    #[cfg(not(feature = "onnx"))]
    pub fn init_recognizer(&self) -> Result<Recognizer> {
        Err(Error::Initialization(format!(
            "built without the `onnx` feature; cannot load {} or {}",
            self.config.vision.landmark_model.display(),
            self.config.vision.classifier_model.display()
        )))
    }

    /// Create the speech synthesizer and audio store
    ///
    /// # Errors
    ///
    /// Returns `Error::Initialization` if the synthesizer URL is invalid or
    /// the audio directory cannot be created
    pub fn init_speech(&self) -> Result<SpeechService> {
        let cfg = &self.config.speech;
        let surface = self.config.server.surface;

        let synthesizer = OpenAiSpeech::new(&cfg.base_url, cfg.model.clone())?
            .with_api_key(cfg.api_key.clone())
            .with_lang_code(cfg.lang_code.clone());

        let store = AudioStore::new(
            cfg.audio_dir.clone(),
            surface.audio_route(),
            surface.file_prefix(),
            cfg.sample_rate,
        );
        store.ensure_dir().map_err(|e| {
            Error::Initialization(format!(
                "cannot create audio directory {}: {e}",
                cfg.audio_dir.display()
            ))
        })?;

        tracing::info!(
            url = %cfg.base_url,
            model = %cfg.model,
            voice = %cfg.voice,
            audio_dir = %cfg.audio_dir.display(),
            "speech synthesizer initialized"
        );

        Ok(SpeechService::new(Arc::new(synthesizer), store).with_voice(cfg.voice.clone()))
    }

    /// Build the API server, leaving out capabilities that failed to load
    #[must_use]
    pub fn build_server(&self) -> ApiServer {
        let server = &self.config.server;
        let mut builder = ApiServerBuilder::new(server.surface, server.port)
            .bind(server.bind.clone())
            .public_url(server.public_url.clone())
            .static_dir(server.static_dir.clone())
            .body_limit(server.max_body_bytes);

        if server.surface.serves_recognition() {
            match self.init_recognizer() {
                Ok(recognizer) => {
                    tracing::info!(
                        threshold = recognizer.threshold(),
                        "ASL model and hand tracker loaded"
                    );
                    builder = builder.recognizer(Arc::new(recognizer));
                }
                Err(e) => tracing::error!(error = %e, "error loading model or tracker"),
            }
        }

        if server.surface.serves_speech() {
            match self.init_speech() {
                Ok(speech) => builder = builder.speech(Arc::new(speech)),
                Err(e) => tracing::error!(error = %e, "error initializing TTS pipeline"),
            }
        }

        builder.build()
    }

    /// Serve until the process is stopped
    ///
    /// # Errors
    ///
    /// Returns error if the server fails to bind or run
    pub async fn run(self) -> Result<()> {
        tracing::info!(
            surface = %self.config.server.surface,
            port = self.config.server.port,
            "daemon running"
        );

        self.build_server().run().await
    }
}
