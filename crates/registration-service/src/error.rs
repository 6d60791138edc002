//! Error types for the registration service.
//!
//! Configuration errors are raised at startup, where they are fatal; only
//! the remaining variants are produced while serving requests.

use crate::store::StoreError;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use platform_client::PlatformError;
use serde::Serialize;
use std::time::Duration;
use thiserror::Error;

/// Registration error types.
#[derive(Debug, Error)]
pub enum RegistrationError {
    #[error("Server configuration error: {} not set", .missing.join(", "))]
    Configuration { missing: Vec<String> },

    #[error("{0}")]
    Validation(String),

    #[error("Platform request timed out after {0:?}")]
    UpstreamTimeout(Duration),

    #[error("Platform error: {0}")]
    Upstream(PlatformError),

    #[error("Failed to persist registration: {0}")]
    Persistence(#[from] StoreError),
}

/// Error response body.
#[derive(Debug, Serialize)]
pub struct ErrorResponse {
    pub error: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub details: Option<String>,
    pub code: String,
}

impl RegistrationError {
    /// HTTP status this error maps to.
    pub fn status_code(&self) -> StatusCode {
        match self {
            RegistrationError::Configuration { .. } => StatusCode::INTERNAL_SERVER_ERROR,
            RegistrationError::Validation(_) => StatusCode::BAD_REQUEST,
            RegistrationError::UpstreamTimeout(_)
            | RegistrationError::Upstream(_)
            | RegistrationError::Persistence(_) => StatusCode::BAD_GATEWAY,
        }
    }

    fn code(&self) -> &'static str {
        match self {
            RegistrationError::Configuration { .. } => "CONFIGURATION_ERROR",
            RegistrationError::Validation(_) => "VALIDATION_ERROR",
            RegistrationError::UpstreamTimeout(_) => "UPSTREAM_TIMEOUT",
            RegistrationError::Upstream(_) => "UPSTREAM_ERROR",
            RegistrationError::Persistence(_) => "PERSISTENCE_ERROR",
        }
    }

    /// Summary and optional details for the response body.
    fn describe(&self) -> (String, Option<String>) {
        match self {
            RegistrationError::Configuration { .. } | RegistrationError::Validation(_) => {
                (self.to_string(), None)
            }
            RegistrationError::UpstreamTimeout(_) => (
                "Failed to register with platform".to_string(),
                Some("Request timed out".to_string()),
            ),
            RegistrationError::Upstream(PlatformError::InvalidResponse) => (
                "Invalid platform response".to_string(),
                Some("Response missing success field or data object".to_string()),
            ),
            RegistrationError::Upstream(PlatformError::MissingFields) => (
                "Invalid platform response".to_string(),
                Some("Response missing required fields: safeWalkId or sharingCode".to_string()),
            ),
            RegistrationError::Upstream(e) => (
                "Failed to register with platform".to_string(),
                Some(e.to_string()),
            ),
            RegistrationError::Persistence(e) => (
                "Failed to store platform registration".to_string(),
                Some(e.to_string()),
            ),
        }
    }
}

impl IntoResponse for RegistrationError {
    fn into_response(self) -> Response {
        let status = self.status_code();
        let (error, details) = self.describe();

        let body = ErrorResponse {
            error,
            details,
            code: self.code().to_string(),
        };

        (status, Json(body)).into_response()
    }
}

impl From<PlatformError> for RegistrationError {
    fn from(e: PlatformError) -> Self {
        match e {
            PlatformError::Timeout(timeout) => RegistrationError::UpstreamTimeout(timeout),
            other => RegistrationError::Upstream(other),
        }
    }
}
