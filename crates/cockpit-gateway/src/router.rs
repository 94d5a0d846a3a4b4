//! Axum router wiring.
//!
//! Same GET surface as a patched target server, with CORS open for GET so
//! a dashboard served from another port can poll it.

use axum::{http::Method, routing::get, Router};
use tower_http::cors::{Any, CorsLayer};

use crate::{app_state::AppState, ops};

pub fn build_router(state: AppState) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods([Method::GET])
        .allow_headers(Any);

    Router::new()
        .route("/v1/metrics", get(ops::metrics))
        .route("/dashboard", get(ops::dashboard))
        .route("/health", get(ops::health))
        .layer(cors)
        .with_state(state)
}
