//! Platform registration workflow.
//!
//! A user is registered with the partner platform at most once: the stored
//! `sharingCode` is the idempotency marker. The flow is
//!
//! 1. read the user record and return early if it already holds a sharing code,
//! 2. register the user with the platform,
//! 3. conditionally store the issued identifiers.
//!
//! A failed read does not block registration. A failed write fails the request
//! even though the platform has already accepted the user.

use crate::config::RegistrationSettings;
use crate::error::RegistrationError;
use crate::store::{SaveOutcome, StoreError, UserStore};
use chrono::Utc;
use platform_client::{PlatformClient, PlatformError, RegistrationPayload};
use secrecy::ExposeSecret;
use std::sync::Arc;
use tracing::{error, info, instrument, warn};

/// How a successful registration request was satisfied.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RegistrationStatus {
    /// The platform issued a new sharing code.
    Registered,
    /// A sharing code was already stored; the platform was not called again.
    AlreadyRegistered,
}

impl RegistrationStatus {
    pub fn message(&self) -> &'static str {
        match self {
            RegistrationStatus::Registered => "Platform registration successful",
            RegistrationStatus::AlreadyRegistered => "User already registered",
        }
    }
}

/// Result of a successful `register` call.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RegistrationOutcome {
    pub status: RegistrationStatus,
    pub user_id: String,
    pub sharing_code: String,
}

/// Registers users with the partner platform and records the result.
pub struct PlatformRegistrar {
    store: Arc<dyn UserStore>,
    platform: PlatformClient,
    vendor_id: String,
}

impl PlatformRegistrar {
    /// Create a registrar.
    pub fn new(
        store: Arc<dyn UserStore>,
        platform: PlatformClient,
        vendor_id: impl Into<String>,
    ) -> Self {
        Self {
            store,
            platform,
            vendor_id: vendor_id.into(),
        }
    }

    /// Create a registrar from validated settings.
    pub fn from_settings(
        store: Arc<dyn UserStore>,
        settings: &RegistrationSettings,
    ) -> Result<Self, PlatformError> {
        let platform = PlatformClient::new(
            &settings.platform_domain,
            settings.api_key.expose_secret().clone(),
            settings.timeout,
        )?;
        Ok(Self::new(store, platform, settings.vendor_id.clone()))
    }

    /// The store this registrar writes to.
    pub fn store(&self) -> &Arc<dyn UserStore> {
        &self.store
    }

    /// Register a user with the platform, unless already registered.
    #[instrument(skip(self))]
    pub async fn register(&self, user_id: &str) -> Result<RegistrationOutcome, RegistrationError> {
        if user_id.is_empty() {
            return Err(RegistrationError::Validation(
                "userId is required and must be a string".to_string(),
            ));
        }

        if let Some(sharing_code) = self.existing_sharing_code(user_id).await {
            info!(user_id = %user_id, "User already registered, returning existing sharing code");
            return Ok(self.outcome(RegistrationStatus::AlreadyRegistered, user_id, sharing_code));
        }

        let payload = RegistrationPayload::new(user_id, self.vendor_id.as_str());
        let registration = self.platform.register(&payload).await.map_err(|e| {
            error!(user_id = %user_id, error = %e, "Platform registration failed");
            RegistrationError::from(e)
        })?;

        info!(user_id = %user_id, "Platform registration successful");

        let outcome = self
            .store
            .save_registration(user_id, &registration, Utc::now())
            .await
            .map_err(|e| {
                error!(
                    user_id = %user_id,
                    error = %e,
                    "Failed to store registration; platform already holds it"
                );
                RegistrationError::Persistence(e)
            })?;

        match outcome {
            SaveOutcome::Saved => {
                info!(user_id = %user_id, "Stored platform registration");
                Ok(self.outcome(
                    RegistrationStatus::Registered,
                    user_id,
                    registration.sharing_code,
                ))
            }
            SaveOutcome::AlreadyRegistered => {
                warn!(
                    user_id = %user_id,
                    "Concurrent registration stored first, returning stored sharing code"
                );
                let record = self.store.get(user_id).await?;
                match record.as_ref().and_then(|r| r.registered_sharing_code()) {
                    Some(sharing_code) => Ok(self.outcome(
                        RegistrationStatus::AlreadyRegistered,
                        user_id,
                        sharing_code.to_string(),
                    )),
                    None => Err(RegistrationError::Persistence(StoreError::Unavailable(
                        "registration write was rejected but no sharing code is stored"
                            .to_string(),
                    ))),
                }
            }
        }
    }

    /// Look up a stored sharing code. Read errors are logged and treated as absent.
    async fn existing_sharing_code(&self, user_id: &str) -> Option<String> {
        match self.store.get(user_id).await {
            Ok(record) => record
                .as_ref()
                .and_then(|r| r.registered_sharing_code())
                .map(str::to_string),
            Err(e) => {
                warn!(
                    user_id = %user_id,
                    error = %e,
                    "Failed to check existing registration, continuing"
                );
                None
            }
        }
    }

    fn outcome(
        &self,
        status: RegistrationStatus,
        user_id: &str,
        sharing_code: String,
    ) -> RegistrationOutcome {
        RegistrationOutcome {
            status,
            user_id: user_id.to_string(),
            sharing_code,
        }
    }
}
