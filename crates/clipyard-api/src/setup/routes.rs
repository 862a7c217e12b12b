//! Route configuration and setup

use crate::handlers;
use crate::state::{AutocropState, OrganizerState};
use axum::{
    routing::{get, post},
    Router,
};
use tower_http::limit::RequestBodyLimitLayer;
use tower_http::trace::TraceLayer;

/// Request bodies are small JSON documents.
const MAX_BODY_BYTES: usize = 1024 * 1024;

/// `GET /health` and `POST /convert`
pub fn autocrop_routes(state: AutocropState) -> Router {
    Router::new()
        .route("/health", get(handlers::health::health))
        .route("/convert", post(handlers::convert::convert_video))
        .layer(RequestBodyLimitLayer::new(MAX_BODY_BYTES))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

/// `GET /health` and `POST /organize`
pub fn organizer_routes(state: OrganizerState) -> Router {
    Router::new()
        .route("/health", get(handlers::health::health))
        .route("/organize", post(handlers::organize::organize_files))
        .layer(RequestBodyLimitLayer::new(MAX_BODY_BYTES))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}
