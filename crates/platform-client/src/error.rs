//! Partner platform client errors.

use std::time::Duration;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum PlatformError {
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("Request timed out after {0:?}")]
    Timeout(Duration),

    #[error("Platform returned status {status}: {body}")]
    Api { status: u16, body: String },

    #[error("Failed to parse platform response: {body}")]
    Parse { body: String },

    #[error("Invalid platform response: missing success field or data object")]
    InvalidResponse,

    #[error("Invalid platform response: missing required fields: safeWalkId or sharingCode")]
    MissingFields,
}

impl PlatformError {
    /// Map a transport error, keeping timeouts distinguishable.
    pub(crate) fn from_transport(e: reqwest::Error, timeout: Duration) -> Self {
        if e.is_timeout() {
            PlatformError::Timeout(timeout)
        } else {
            PlatformError::Http(e)
        }
    }
}
