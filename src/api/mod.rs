//! HTTP API server for the fingerspell gateway

mod body;
mod error;
pub mod health;
pub mod recognition;
pub mod speech;
pub mod word;

pub use error::ApiError;

use std::path::PathBuf;
use std::sync::Arc;

use axum::Router;
use axum::extract::DefaultBodyLimit;
use tokio::net::TcpListener;
use tokio::sync::Mutex;
use tower_http::cors::{Any, CorsLayer};
use tower_http::services::{ServeDir, ServeFile};
use tower_http::trace::TraceLayer;

use crate::Result;
use crate::config::{DEFAULT_BIND, DEFAULT_BODY_LIMIT, Surface};
use crate::recognition::Recognizer;
use crate::session::Session;
use crate::speech::SpeechService;

/// Shared state for API handlers
pub struct ApiState {
    pub surface: Surface,
    /// Absent when the landmark or classifier model failed to load
    pub recognizer: Option<Arc<Recognizer>>,
    /// Absent when the synthesizer failed to initialize
    pub speech: Option<Arc<SpeechService>>,
    /// Word buffer and last detection, shared by every caller
    pub session: Arc<Mutex<Session>>,
    pub public_url: Option<String>,
}

/// Configuration for building an API server
pub struct ApiServerBuilder {
    surface: Surface,
    bind: String,
    port: u16,
    recognizer: Option<Arc<Recognizer>>,
    speech: Option<Arc<SpeechService>>,
    session: Option<Arc<Mutex<Session>>>,
    public_url: Option<String>,
    static_dir: Option<PathBuf>,
    body_limit: usize,
}

impl ApiServerBuilder {
    /// Create a new API server builder
    #[must_use]
    pub fn new(surface: Surface, port: u16) -> Self {
        Self {
            surface,
            bind: DEFAULT_BIND.to_string(),
            port,
            recognizer: None,
            speech: None,
            session: None,
            public_url: None,
            static_dir: None,
            body_limit: DEFAULT_BODY_LIMIT,
        }
    }

    /// Set the bind address
    #[must_use]
    pub fn bind(mut self, addr: impl Into<String>) -> Self {
        self.bind = addr.into();
        self
    }

    /// Set the frame recognizer
    #[must_use]
    pub fn recognizer(mut self, recognizer: Arc<Recognizer>) -> Self {
        self.recognizer = Some(recognizer);
        self
    }

    /// Set the speech service
    #[must_use]
    pub fn speech(mut self, speech: Arc<SpeechService>) -> Self {
        self.speech = Some(speech);
        self
    }

    /// Share an existing session instead of starting empty
    #[must_use]
    pub fn session(mut self, session: Arc<Mutex<Session>>) -> Self {
        self.session = Some(session);
        self
    }

    /// Set the base URL used in generated audio links
    #[must_use]
    pub fn public_url(mut self, url: Option<String>) -> Self {
        self.public_url = url;
        self
    }

    /// Set the static files directory for serving the web UI
    #[must_use]
    pub fn static_dir(mut self, dir: Option<PathBuf>) -> Self {
        self.static_dir = dir;
        self
    }

    /// Set the largest accepted request body in bytes
    #[must_use]
    pub const fn body_limit(mut self, bytes: usize) -> Self {
        self.body_limit = bytes;
        self
    }

    /// Build the API server
    #[must_use]
    pub fn build(self) -> ApiServer {
        let state = Arc::new(ApiState {
            surface: self.surface,
            recognizer: self.recognizer,
            speech: self.speech,
            session: self
                .session
                .unwrap_or_else(|| Arc::new(Mutex::new(Session::new()))),
            public_url: self.public_url,
        });

        ApiServer {
            state,
            bind: self.bind,
            port: self.port,
            static_dir: self.static_dir,
            body_limit: self.body_limit,
        }
    }
}

/// API server
pub struct ApiServer {
    state: Arc<ApiState>,
    bind: String,
    port: u16,
    static_dir: Option<PathBuf>,
    body_limit: usize,
}

impl ApiServer {
    #[must_use]
    pub fn state(&self) -> Arc<ApiState> {
        self.state.clone()
    }

    /// Build the router for this server's surface
    #[must_use]
    pub fn router(&self) -> Router {
        let surface = self.state.surface;
        let mut router = Router::new().merge(health::router(self.state.clone()));

        if surface.serves_recognition() {
            router = router
                .merge(recognition::router(self.state.clone()))
                .merge(word::router(self.state.clone()));
        }

        if surface.serves_speech() {
            router = router.merge(speech::router(self.state.clone()));

            if let Some(speech) = &self.state.speech {
                let store = speech.store();
                router = router.nest_service(
                    &format!("/{}", store.route()),
                    ServeDir::new(store.dir()),
                );
                tracing::info!(
                    path = %store.dir().display(),
                    route = store.route(),
                    "serving generated audio"
                );
            }
        }

        // Serve static files if configured
        if let Some(static_dir) = &self.static_dir {
            let index_file = static_dir.join("index.html");
            let serve_dir =
                ServeDir::new(static_dir).not_found_service(ServeFile::new(&index_file));

            router = router.fallback_service(serve_dir);
            tracing::info!(path = %static_dir.display(), "serving static files");
        }

        // CORS layer for cross-origin requests from frontend
        let cors = CorsLayer::new()
            .allow_origin(Any)
            .allow_methods(Any)
            .allow_headers(Any);

        router
            .layer(DefaultBodyLimit::max(self.body_limit))
            .layer(cors)
            .layer(TraceLayer::new_for_http())
    }

    /// Run the API server
    ///
    /// # Errors
    ///
    /// Returns error if server fails to bind or run
    pub async fn run(self) -> Result<()> {
        let addr = format!("{}:{}", self.bind, self.port);
        let listener = TcpListener::bind(&addr)
            .await
            .map_err(|e| crate::Error::Config(format!("failed to bind API server: {e}")))?;

        tracing::info!(
            addr = %addr,
            surface = %self.state.surface,
            recognition = self.state.recognizer.is_some(),
            speech = self.state.speech.is_some(),
            "API server listening"
        );

        axum::serve(listener, self.router())
            .await
            .map_err(|e| crate::Error::Config(format!("API server error: {e}")))?;

        Ok(())
    }

    /// Run the API server in a background task
    #[must_use]
    pub fn spawn(self) -> tokio::task::JoinHandle<Result<()>> {
        tokio::spawn(async move { self.run().await })
    }
}
