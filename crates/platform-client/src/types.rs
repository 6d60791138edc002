//! Request and response types for the platform registration API.

use crate::error::PlatformError;
use serde::{Deserialize, Serialize};

/// Body of `POST /register`.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct RegistrationPayload {
    pub platform_user_id: String,
    pub platform_id: String,
}

impl RegistrationPayload {
    pub fn new(platform_user_id: impl Into<String>, platform_id: impl Into<String>) -> Self {
        Self {
            platform_user_id: platform_user_id.into(),
            platform_id: platform_id.into(),
        }
    }
}

/// Raw response from `POST /register`.
///
/// Every field is optional on the wire; [`RegistrationResponse::into_registration`]
/// decides whether the platform actually accepted the user.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct RegistrationResponse {
    #[serde(default)]
    pub success: bool,
    #[serde(default)]
    pub data: Option<RegistrationData>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RegistrationData {
    #[serde(default)]
    pub safe_walk_id: Option<String>,
    #[serde(default)]
    pub sharing_code: Option<String>,
}

/// A registration the platform has confirmed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PlatformRegistration {
    pub safe_walk_id: String,
    pub sharing_code: String,
}

impl RegistrationResponse {
    /// Validate the response and extract the issued identifiers.
    pub fn into_registration(self) -> Result<PlatformRegistration, PlatformError> {
        let data = match (self.success, self.data) {
            (true, Some(data)) => data,
            _ => return Err(PlatformError::InvalidResponse),
        };

        match (non_empty(data.safe_walk_id), non_empty(data.sharing_code)) {
            (Some(safe_walk_id), Some(sharing_code)) => Ok(PlatformRegistration {
                safe_walk_id,
                sharing_code,
            }),
            _ => Err(PlatformError::MissingFields),
        }
    }
}

fn non_empty(value: Option<String>) -> Option<String> {
    value.filter(|v| !v.is_empty())
}
