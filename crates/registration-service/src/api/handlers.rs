//! HTTP request handlers.

use super::types::{HealthResponse, RegisterRequest, RegisterResponse};
use super::AppState;
use crate::error::RegistrationError;
use axum::{body::Bytes, extract::State, Json};
use tracing::info;

/// Health check endpoint.
pub async fn health(State(state): State<AppState>) -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "ok".to_string(),
        store: state.registrar.store().backend().to_string(),
    })
}

/// Register a user with the partner platform.
pub async fn register_platform(
    State(state): State<AppState>,
    body: Bytes,
) -> Result<Json<RegisterResponse>, RegistrationError> {
    let request = RegisterRequest::from_body(&body)?;
    info!(user_id = %request.user_id, "Platform registration request received");

    let outcome = state.registrar.register(&request.user_id).await?;

    Ok(Json(outcome.into()))
}
