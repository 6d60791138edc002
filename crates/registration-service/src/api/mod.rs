//! HTTP API for the registration service.

mod handlers;
mod middleware;
mod types;

pub use handlers::*;
pub use middleware::logging_middleware;
pub use types::*;

use crate::registrar::PlatformRegistrar;
use axum::{
    http::{header, Method},
    middleware as axum_middleware,
    routing::{get, post},
    Router,
};
use std::sync::Arc;
use tower_http::{
    cors::{Any, CorsLayer},
    trace::TraceLayer,
};

/// Shared application state.
#[derive(Clone)]
pub struct AppState {
    /// Registration workflow
    pub registrar: Arc<PlatformRegistrar>,
}

impl AppState {
    /// Create new application state.
    pub fn new(registrar: PlatformRegistrar) -> Self {
        Self {
            registrar: Arc::new(registrar),
        }
    }
}

/// CORS policy matching the public API gateway.
fn cors_layer() -> CorsLayer {
    CorsLayer::new()
        .allow_origin(Any)
        .allow_methods([Method::GET, Method::POST])
        .allow_headers([header::CONTENT_TYPE, header::AUTHORIZATION])
}

/// Create the API router.
pub fn create_router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(handlers::health))
        .route("/register/platform", post(handlers::register_platform))
        .layer(axum_middleware::from_fn(logging_middleware))
        .layer(cors_layer())
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}
