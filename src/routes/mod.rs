//! Route table.
//!
//! ## Function endpoints (mounted under `/api` and `/.netlify/functions`)
//! - `POST /exchange-token`: OAuth code → access token
//! - `POST /update-content`: replace one section of the site document (Bearer)
//! - `POST /upload-image`: commit an image from a multipart form (Bearer)
//!
//! `OPTIONS` on any of them is a CORS preflight answered with 200; every
//! other method gets a JSON 405.
//!
//! ## Probes
//! - `GET /healthz`, `GET /readyz`

use crate::{
    handlers::{
        content_handlers::update_content,
        health_handlers::{healthz, readyz},
        image_handlers::upload_image,
        method_not_allowed,
        token_handlers::exchange_token,
    },
    state::AppState,
};
use axum::{
    Router,
    extract::DefaultBodyLimit,
    http::{Method, header},
    routing::{get, post},
};
use tower_http::{
    cors::{Any, CorsLayer},
    trace::TraceLayer,
};

/// Build the full router with shared state, CORS and request tracing applied.
pub fn build_router(state: AppState) -> Router {
    let upload_limit = state.config().max_upload_bytes;

    Router::new()
        .route("/healthz", get(healthz))
        .route("/readyz", get(readyz))
        .nest("/api", functions(upload_limit))
        .nest("/.netlify/functions", functions(upload_limit))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

/// The three function endpoints, CORS-wrapped.
fn functions(upload_limit: usize) -> Router<AppState> {
    Router::new()
        .route(
            "/exchange-token",
            post(exchange_token).fallback(method_not_allowed),
        )
        .route(
            "/update-content",
            post(update_content).fallback(method_not_allowed),
        )
        .route(
            "/upload-image",
            post(upload_image)
                .fallback(method_not_allowed)
                .layer(DefaultBodyLimit::max(upload_limit)),
        )
        .layer(cors_layer())
}

/// Any origin may call the functions; preflight (`OPTIONS`) is answered by
/// the layer itself before the method router sees it.
pub fn cors_layer() -> CorsLayer {
    CorsLayer::new()
        .allow_origin(Any)
        .allow_methods([Method::POST, Method::OPTIONS])
        .allow_headers([header::CONTENT_TYPE, header::AUTHORIZATION])
}
