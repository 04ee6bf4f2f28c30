//! HTTP surface of the gateway.

pub mod cors;
mod handlers;

use crate::gateway::Gateway;
use axum::routing::{get, post};
use axum::{middleware, Router};
use tower_http::trace::TraceLayer;

/// Build the gateway router.
pub fn router(gateway: Gateway) -> Router {
    Router::new()
        .route("/analyze-patient", post(handlers::analyze))
        .route("/health", get(handlers::health))
        .fallback(handlers::not_found)
        .layer(middleware::from_fn(cors::cors))
        .layer(TraceLayer::new_for_http())
        .with_state(gateway)
}
