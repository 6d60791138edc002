//! DynamoDB-backed user store.

use super::{format_timestamp, SaveOutcome, StoreError, UserRecord, UserStore};
use async_trait::async_trait;
use aws_sdk_dynamodb::error::DisplayErrorContext;
use aws_sdk_dynamodb::types::AttributeValue;
use aws_sdk_dynamodb::Client;
use chrono::{DateTime, Utc};
use platform_client::PlatformRegistration;
use std::collections::HashMap;
use tracing::{debug, instrument};

const SAFE_WALK_ID: &str = "safeWalkId";
const SHARING_CODE: &str = "sharingCode";
const UPDATED_AT: &str = "updatedAt";

/// Registration write. Only succeeds while the user has no sharing code.
const UPDATE_EXPRESSION: &str =
    "SET safeWalkId = :safeWalkId, sharingCode = :sharingCode, updatedAt = :updatedAt";
const CONDITION_EXPRESSION: &str = "attribute_not_exists(sharingCode) OR sharingCode = :empty";

/// User store backed by a DynamoDB table keyed by user id.
#[derive(Clone)]
pub struct DynamoUserStore {
    client: Client,
    table_name: String,
    partition_key: String,
}

impl DynamoUserStore {
    /// Create a store over an existing client.
    pub fn new(
        client: Client,
        table_name: impl Into<String>,
        partition_key: impl Into<String>,
    ) -> Self {
        Self {
            client,
            table_name: table_name.into(),
            partition_key: partition_key.into(),
        }
    }

    /// Create a store using credentials and region from the environment.
    pub async fn from_env(table_name: impl Into<String>, partition_key: impl Into<String>) -> Self {
        let config = aws_config::load_defaults(aws_config::BehaviorVersion::latest()).await;
        Self::new(Client::new(&config), table_name, partition_key)
    }

    fn key(&self, user_id: &str) -> (String, AttributeValue) {
        (
            self.partition_key.clone(),
            AttributeValue::S(user_id.to_string()),
        )
    }
}

#[async_trait]
impl UserStore for DynamoUserStore {
    fn backend(&self) -> &'static str {
        "dynamodb"
    }

    #[instrument(skip(self), fields(table = %self.table_name))]
    async fn get(&self, user_id: &str) -> Result<Option<UserRecord>, StoreError> {
        let (key_name, key_value) = self.key(user_id);

        let output = self
            .client
            .get_item()
            .table_name(&self.table_name)
            .key(key_name, key_value)
            .consistent_read(true)
            .send()
            .await
            .map_err(|e| StoreError::Unavailable(DisplayErrorContext(&e).to_string()))?;

        Ok(output.item().map(|item| record_from_item(user_id, item)))
    }

    #[instrument(skip(self, registration), fields(table = %self.table_name))]
    async fn save_registration(
        &self,
        user_id: &str,
        registration: &PlatformRegistration,
        updated_at: DateTime<Utc>,
    ) -> Result<SaveOutcome, StoreError> {
        let (key_name, key_value) = self.key(user_id);

        let result = self
            .client
            .update_item()
            .table_name(&self.table_name)
            .key(key_name, key_value)
            .update_expression(UPDATE_EXPRESSION)
            .condition_expression(CONDITION_EXPRESSION)
            .expression_attribute_values(
                ":safeWalkId",
                AttributeValue::S(registration.safe_walk_id.clone()),
            )
            .expression_attribute_values(
                ":sharingCode",
                AttributeValue::S(registration.sharing_code.clone()),
            )
            .expression_attribute_values(
                ":updatedAt",
                AttributeValue::S(format_timestamp(&updated_at)),
            )
            .expression_attribute_values(":empty", AttributeValue::S(String::new()))
            .send()
            .await;

        match result {
            Ok(_) => {
                debug!(user_id = %user_id, "Stored platform registration");
                Ok(SaveOutcome::Saved)
            }
            Err(e)
                if e.as_service_error()
                    .is_some_and(|se| se.is_conditional_check_failed_exception()) =>
            {
                debug!(user_id = %user_id, "Conditional write rejected, user already registered");
                Ok(SaveOutcome::AlreadyRegistered)
            }
            Err(e) => Err(StoreError::Unavailable(DisplayErrorContext(&e).to_string())),
        }
    }
}

/// Convert a DynamoDB item to a user record. Unknown or mistyped attributes are ignored.
fn record_from_item(user_id: &str, item: &HashMap<String, AttributeValue>) -> UserRecord {
    let string = |name: &str| item.get(name).and_then(|v| v.as_s().ok()).cloned();

    UserRecord {
        user_id: user_id.to_string(),
        safe_walk_id: string(SAFE_WALK_ID),
        sharing_code: string(SHARING_CODE),
        updated_at: string(UPDATED_AT)
            .and_then(|s| DateTime::parse_from_rfc3339(&s).ok())
            .map(|dt| dt.with_timezone(&Utc)),
    }
}
