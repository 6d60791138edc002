//! API request and response types.

use crate::error::RegistrationError;
use crate::registrar::RegistrationOutcome;
use serde::Serialize;
use serde_json::Value;

/// Request to register a user with the platform.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RegisterRequest {
    pub user_id: String,
}

impl RegisterRequest {
    /// Parse a raw request body.
    ///
    /// The body is parsed as loose JSON first so that a missing, empty or
    /// non-string `userId` gets a specific error message.
    pub fn from_body(body: &[u8]) -> Result<Self, RegistrationError> {
        if body.iter().all(u8::is_ascii_whitespace) {
            return Err(RegistrationError::Validation(
                "Request body is required".to_string(),
            ));
        }

        let value: Value = serde_json::from_slice(body).map_err(|_| {
            RegistrationError::Validation("Invalid JSON in request body".to_string())
        })?;

        match value.get("userId").and_then(Value::as_str) {
            Some(user_id) if !user_id.is_empty() => Ok(Self {
                user_id: user_id.to_string(),
            }),
            _ => Err(RegistrationError::Validation(
                "userId is required and must be a string".to_string(),
            )),
        }
    }
}

/// Response after a successful registration request.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RegisterResponse {
    pub message: String,
    pub user_id: String,
    pub sharing_code: String,
}

impl From<RegistrationOutcome> for RegisterResponse {
    fn from(outcome: RegistrationOutcome) -> Self {
        Self {
            message: outcome.status.message().to_string(),
            user_id: outcome.user_id,
            sharing_code: outcome.sharing_code,
        }
    }
}

/// Health check response.
#[derive(Debug, Serialize)]
pub struct HealthResponse {
    pub status: String,
    pub store: String,
}
