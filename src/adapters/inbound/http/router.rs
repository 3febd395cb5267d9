use axum::{
    Router,
    extract::DefaultBodyLimit,
    routing::{delete, get, post},
};
use std::sync::Arc;
use tower_http::trace::TraceLayer;

use super::handlers::{delete_attachment, health, upload_attachment};
use crate::{ports::repositories::AttachmentCatalog, services::FileHandlers};

/// Default upper bound on a request body
pub const DEFAULT_BODY_LIMIT: usize = 64 * 1024 * 1024;

/// Application state shared by the handlers
#[derive(Clone)]
pub struct AppState {
    pub handlers: FileHandlers,
    pub catalog: Arc<dyn AttachmentCatalog>,
}

/// Create the main application router with all endpoints
pub fn create_router(state: AppState) -> Router {
    create_router_with_limit(state, DEFAULT_BODY_LIMIT)
}

pub fn create_router_with_limit(state: AppState, body_limit: usize) -> Router {
    Router::new()
        .route("/health", get(health))
        .route("/attachments/{category}", post(upload_attachment))
        .route("/attachments/{category}/{*key}", delete(delete_attachment))
        .layer(DefaultBodyLimit::max(body_limit))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}
