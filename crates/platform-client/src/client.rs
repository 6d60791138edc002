//! Partner platform HTTP client.

use crate::error::PlatformError;
use crate::types::*;
use reqwest::Client;
use secrecy::{ExposeSecret, SecretString};
use std::time::Duration;
use tracing::{debug, instrument, warn};

/// Default request timeout for platform calls.
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(15);

/// Client for the platform's registration endpoint.
///
/// The API key is stored using `SecretString` so it never shows up in
/// logs or debug output.
#[derive(Clone)]
pub struct PlatformClient {
    client: Client,
    register_url: String,
    api_key: SecretString,
    timeout: Duration,
}

impl PlatformClient {
    /// Create a new platform client.
    ///
    /// `domain` may be a bare host (`partner.example.com`) or a full base URL.
    pub fn new(
        domain: &str,
        api_key: impl Into<String>,
        timeout: Duration,
    ) -> Result<Self, PlatformError> {
        let client = Client::builder().timeout(timeout).build()?;

        Ok(Self {
            client,
            register_url: register_url(domain),
            api_key: SecretString::new(api_key.into()),
            timeout,
        })
    }

    /// Full URL registrations are posted to.
    pub fn register_url(&self) -> &str {
        &self.register_url
    }

    /// Register a user with the platform.
    ///
    /// A single attempt is made. The request is aborted once the configured
    /// timeout elapses.
    #[instrument(skip(self, payload), fields(platform_user_id = %payload.platform_user_id))]
    pub async fn register(
        &self,
        payload: &RegistrationPayload,
    ) -> Result<PlatformRegistration, PlatformError> {
        debug!(url = %self.register_url, "Sending registration request to platform");

        let response = self
            .client
            .post(&self.register_url)
            .header("x-api-key", self.api_key.expose_secret())
            .header("Content-Type", "application/json")
            .json(payload)
            .send()
            .await
            .map_err(|e| PlatformError::from_transport(e, self.timeout))?;

        let status = response.status();
        let body = response
            .text()
            .await
            .map_err(|e| PlatformError::from_transport(e, self.timeout))?;

        let preview: String = body.chars().take(200).collect();
        debug!(%status, body = %preview, "Platform response received");

        if !status.is_success() {
            warn!(%status, "Platform registration rejected");
            return Err(PlatformError::Api {
                status: status.as_u16(),
                body,
            });
        }

        let parsed: RegistrationResponse = match serde_json::from_str(&body) {
            Ok(parsed) => parsed,
            Err(e) => {
                warn!(error = %e, "Platform response is not valid JSON");
                return Err(PlatformError::Parse { body });
            }
        };

        parsed.into_registration()
    }
}

/// Build the registration URL from a configured platform domain.
///
/// A missing scheme defaults to `https://`.
pub fn register_url(domain: &str) -> String {
    let domain = domain.trim().trim_end_matches('/');
    if domain.starts_with("http://") || domain.starts_with("https://") {
        format!("{}/register", domain)
    } else {
        format!("https://{}/register", domain)
    }
}
