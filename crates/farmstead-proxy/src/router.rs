//! Axum router construction for the proxy.

use std::sync::Arc;

use axum::Router;
use axum::routing::{get, post};
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;

use crate::handlers;
use crate::state::AppState;

/// Build the proxy router.
///
/// CORS allows any origin so the web mini-app can call the proxy from
/// wherever it is hosted.
pub fn build_router(state: Arc<AppState>) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    Router::new()
        .route("/health", get(handlers::health))
        .route("/api/chain", get(handlers::get_chain))
        .route("/api/player", get(handlers::get_player))
        .route("/api/plot", get(handlers::get_plot))
        .route("/api/tx", post(handlers::submit_tx))
        .route("/api/tx/{id}", get(handlers::get_tx))
        .layer(cors)
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}
