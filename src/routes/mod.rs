// src/routes/mod.rs
pub mod chat;
pub mod envelope;

use crate::state::SharedState;
use axum::{
    Router,
    routing::{any, get},
};
use chat::chat_handler;
use tower_http::trace::TraceLayer;

pub fn create_router() -> Router<SharedState> {
    Router::new()
        // Every method reaches the handler so non-POST gets the JSON 405.
        .route("/api/chat", any(chat_handler))
        .route("/health", get(|| async { "OK" }))
        .layer(TraceLayer::new_for_http())
}
