//! User store holding platform registrations.

mod dynamo;
mod memory;

pub use dynamo::DynamoUserStore;
pub use memory::MemoryUserStore;

use async_trait::async_trait;
use chrono::{DateTime, SecondsFormat, Utc};
use platform_client::PlatformRegistration;
use thiserror::Error;

/// Store error types.
#[derive(Debug, Error)]
pub enum StoreError {
    #[error("User store unavailable: {0}")]
    Unavailable(String),
}

/// A stored user, keyed by user id.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UserRecord {
    pub user_id: String,

    /// Platform-issued user identifier
    pub safe_walk_id: Option<String>,

    /// Platform-issued sharing code; its presence marks the user as registered
    pub sharing_code: Option<String>,

    pub updated_at: Option<DateTime<Utc>>,
}

impl UserRecord {
    /// Create a record for a user with no registration.
    pub fn new(user_id: impl Into<String>) -> Self {
        Self {
            user_id: user_id.into(),
            safe_walk_id: None,
            sharing_code: None,
            updated_at: None,
        }
    }

    /// Create a record from a confirmed platform registration.
    pub fn registered(
        user_id: impl Into<String>,
        registration: &PlatformRegistration,
        updated_at: DateTime<Utc>,
    ) -> Self {
        Self {
            user_id: user_id.into(),
            safe_walk_id: Some(registration.safe_walk_id.clone()),
            sharing_code: Some(registration.sharing_code.clone()),
            updated_at: Some(updated_at),
        }
    }

    /// Check if the user already holds a sharing code.
    pub fn is_registered(&self) -> bool {
        self.registered_sharing_code().is_some()
    }

    /// The sharing code, if the user is registered.
    pub fn registered_sharing_code(&self) -> Option<&str> {
        self.sharing_code.as_deref().filter(|code| !code.is_empty())
    }
}

/// Result of a conditional registration write.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SaveOutcome {
    /// The registration was written.
    Saved,
    /// The record already held a sharing code; nothing was written.
    AlreadyRegistered,
}

/// Storage backend for user records.
///
/// `save_registration` is a conditional write: it must only succeed when the
/// stored record has no sharing code yet.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait UserStore: Send + Sync {
    /// Backend name for diagnostics.
    fn backend(&self) -> &'static str;

    /// Get a record by user id.
    async fn get(&self, user_id: &str) -> Result<Option<UserRecord>, StoreError>;

    /// Set `safeWalkId`, `sharingCode` and `updatedAt` for a user.
    async fn save_registration(
        &self,
        user_id: &str,
        registration: &PlatformRegistration,
        updated_at: DateTime<Utc>,
    ) -> Result<SaveOutcome, StoreError>;
}

/// ISO-8601 timestamp with millisecond precision, as stored in `updatedAt`.
pub fn format_timestamp(timestamp: &DateTime<Utc>) -> String {
    timestamp.to_rfc3339_opts(SecondsFormat::Millis, true)
}
