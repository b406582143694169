//! HTTP shell around the summarize-then-quiz pipeline.

pub mod api_error;
pub mod handlers;
pub mod session_store;
pub mod session_view;

use axum::{
    extract::DefaultBodyLimit,
    routing::{get, post, put},
    Router,
};
use chatbot::{ChatService, GenerationClient};
use session_store::SessionStore;
use std::sync::Arc;
use std::time::Duration;
use tower_http::cors::{AllowHeaders, AllowMethods, Any, CorsLayer};

/// Largest accepted upload body, 200 MiB.
pub const DEFAULT_MAX_UPLOAD_BYTES: usize = 200 * 1024 * 1024;

pub struct AppState<G> {
    pub chat_service: Arc<ChatService<G>>,
    pub sessions: Arc<SessionStore>,
    pub max_upload_bytes: usize,
}

impl<G> Clone for AppState<G> {
    fn clone(&self) -> Self {
        Self {
            chat_service: self.chat_service.clone(),
            sessions: self.sessions.clone(),
            max_upload_bytes: self.max_upload_bytes,
        }
    }
}

impl<G: GenerationClient> AppState<G> {
    pub fn new(client: Arc<G>) -> Self {
        Self {
            chat_service: Arc::new(ChatService::new(client)),
            sessions: Arc::new(SessionStore::new()),
            max_upload_bytes: DEFAULT_MAX_UPLOAD_BYTES,
        }
    }

    pub fn with_max_upload_bytes(mut self, max_upload_bytes: usize) -> Self {
        self.max_upload_bytes = max_upload_bytes;
        self
    }

    /// Replaces the session store; call before any session is created.
    pub fn with_session_ttl(mut self, ttl: Duration) -> Self {
        self.sessions = Arc::new(SessionStore::with_ttl(ttl));
        self
    }
}

pub fn build_router<G: GenerationClient + 'static>(state: AppState<G>) -> Router {
    let body_limit = state.max_upload_bytes;

    Router::new()
        .route("/health", get(handlers::health_check))
        .route("/sessions", post(handlers::create_session::<G>))
        .route(
            "/sessions/:id",
            get(handlers::get_session::<G>).delete(handlers::delete_session::<G>),
        )
        .route("/sessions/:id/summarize", post(handlers::summarize::<G>))
        .route(
            "/sessions/:id/answers/:question",
            put(handlers::record_answer::<G>),
        )
        .route("/sessions/:id/submit", post(handlers::submit::<G>))
        .layer(DefaultBodyLimit::max(body_limit))
        .layer(
            CorsLayer::new()
                .allow_origin(Any)
                .allow_methods(AllowMethods::any())
                .allow_headers(AllowHeaders::any()),
        )
        .with_state(state)
}
