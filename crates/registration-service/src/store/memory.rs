//! In-memory user store.

use super::{SaveOutcome, StoreError, UserRecord, UserStore};
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use platform_client::PlatformRegistration;
use std::collections::HashMap;
use tokio::sync::RwLock;
use tracing::debug;

/// In-memory user store for local runs and tests.
///
/// Records are lost on restart.
#[derive(Debug, Default)]
pub struct MemoryUserStore {
    /// User records indexed by user id
    records: RwLock<HashMap<String, UserRecord>>,
}

impl MemoryUserStore {
    /// Create a new empty store.
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert or replace a record.
    pub async fn insert(&self, record: UserRecord) {
        self.records
            .write()
            .await
            .insert(record.user_id.clone(), record);
    }

    /// Get the number of stored records.
    pub async fn count(&self) -> usize {
        self.records.read().await.len()
    }
}

#[async_trait]
impl UserStore for MemoryUserStore {
    fn backend(&self) -> &'static str {
        "memory"
    }

    async fn get(&self, user_id: &str) -> Result<Option<UserRecord>, StoreError> {
        Ok(self.records.read().await.get(user_id).cloned())
    }

    async fn save_registration(
        &self,
        user_id: &str,
        registration: &PlatformRegistration,
        updated_at: DateTime<Utc>,
    ) -> Result<SaveOutcome, StoreError> {
        let mut records = self.records.write().await;

        if records.get(user_id).is_some_and(UserRecord::is_registered) {
            debug!(user_id = %user_id, "Conditional write rejected, user already registered");
            return Ok(SaveOutcome::AlreadyRegistered);
        }

        records.insert(
            user_id.to_string(),
            UserRecord::registered(user_id, registration, updated_at),
        );
        Ok(SaveOutcome::Saved)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn registration(code: &str) -> PlatformRegistration {
        PlatformRegistration {
            safe_walk_id: format!("S-{}", code),
            sharing_code: code.into(),
        }
    }

    #[tokio::test]
    async fn test_get_missing_record() {
        let store = MemoryUserStore::new();
        assert!(store.get("u1").await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_save_and_get() {
        let store = MemoryUserStore::new();

        let outcome = store
            .save_registration("u1", &registration("C1"), Utc::now())
            .await
            .unwrap();
        assert_eq!(outcome, SaveOutcome::Saved);

        let record = store.get("u1").await.unwrap().unwrap();
        assert_eq!(record.registered_sharing_code(), Some("C1"));
        assert_eq!(record.safe_walk_id.as_deref(), Some("S-C1"));
        assert!(record.updated_at.is_some());
        assert_eq!(store.count().await, 1);
    }

    #[tokio::test]
    async fn test_save_does_not_overwrite_registration() {
        let store = MemoryUserStore::new();
        store
            .save_registration("u1", &registration("C1"), Utc::now())
            .await
            .unwrap();

        let outcome = store
            .save_registration("u1", &registration("C2"), Utc::now())
            .await
            .unwrap();

        assert_eq!(outcome, SaveOutcome::AlreadyRegistered);
        let record = store.get("u1").await.unwrap().unwrap();
        assert_eq!(record.registered_sharing_code(), Some("C1"));
    }

    #[tokio::test]
    async fn test_save_over_unregistered_record() {
        let store = MemoryUserStore::new();
        store.insert(UserRecord::new("u1")).await;

        let outcome = store
            .save_registration("u1", &registration("C1"), Utc::now())
            .await
            .unwrap();

        assert_eq!(outcome, SaveOutcome::Saved);
        assert_eq!(
            store.get("u1").await.unwrap().unwrap().registered_sharing_code(),
            Some("C1")
        );
    }
}
