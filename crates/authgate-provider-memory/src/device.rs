//! In-memory device authorization store.

use std::collections::HashMap;

use async_trait::async_trait;
use time::OffsetDateTime;
use tokio::sync::RwLock;

use authgate_provider::storage::DeviceCodeStorage;
use authgate_provider::types::{DeviceCodeRecord, DeviceCodeStatus};
use authgate_provider::{AuthError, AuthResult};

/// Device authorization store keyed by device code hash.
#[derive(Debug, Default)]
pub struct InMemoryDeviceCodeStorage {
    records: RwLock<HashMap<String, DeviceCodeRecord>>,
}

impl InMemoryDeviceCodeStorage {
    /// Creates an empty device code store.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl DeviceCodeStorage for InMemoryDeviceCodeStorage {
    async fn create(&self, record: &DeviceCodeRecord) -> AuthResult<()> {
        self.records
            .write()
            .await
            .insert(record.device_code_hash.clone(), record.clone());
        Ok(())
    }

    async fn find_by_device_code_hash(
        &self,
        device_code_hash: &str,
    ) -> AuthResult<Option<DeviceCodeRecord>> {
        Ok(self.records.read().await.get(device_code_hash).cloned())
    }

    async fn find_by_user_code(&self, user_code: &str) -> AuthResult<Option<DeviceCodeRecord>> {
        Ok(self
            .records
            .read()
            .await
            .values()
            .find(|r| r.user_code == user_code)
            .cloned())
    }

    async fn transition(
        &self,
        user_code: &str,
        status: DeviceCodeStatus,
        user_id: Option<&str>,
    ) -> AuthResult<DeviceCodeRecord> {
        // Check and move under one write guard so two decisions for the same
        // user code see exactly one winner
        let mut records = self.records.write().await;
        let record = records
            .values_mut()
            .find(|r| r.user_code == user_code)
            .ok_or_else(|| AuthError::invalid_grant("Unknown user code"))?;
        if !record.is_pending() {
            return Err(AuthError::invalid_grant("Device code already processed"));
        }
        record.status = status;
        record.user_id = user_id.map(ToString::to_string);
        Ok(record.clone())
    }

    async fn mark_polled(&self, device_code_hash: &str, at: OffsetDateTime) -> AuthResult<()> {
        let mut records = self.records.write().await;
        let record = records
            .get_mut(device_code_hash)
            .ok_or_else(|| AuthError::storage("Device code not found"))?;
        record.last_polled_at = Some(at);
        Ok(())
    }

    async fn cleanup_expired(&self) -> AuthResult<u64> {
        let mut records = self.records.write().await;
        let before = records.len();
        records.retain(|_, r| !r.is_expired());
        Ok((before - records.len()) as u64)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use time::Duration;
    use uuid::Uuid;

    fn record(hash: &str, user_code: &str) -> DeviceCodeRecord {
        let now = OffsetDateTime::now_utc();
        DeviceCodeRecord {
            id: Uuid::new_v4(),
            device_code_hash: hash.to_string(),
            user_code: user_code.to_string(),
            client_id: "agw_tv".to_string(),
            user_id: None,
            scope: "openid".to_string(),
            status: DeviceCodeStatus::Pending,
            verification_uri: "https://auth.example.com/device".to_string(),
            verification_uri_complete: format!(
                "https://auth.example.com/device?user_code={user_code}"
            ),
            expires_at: now + Duration::minutes(15),
            interval: 5,
            last_polled_at: None,
            created_at: now,
        }
    }

    #[tokio::test]
    async fn test_transition_is_single_decision() {
        let store = InMemoryDeviceCodeStorage::new();
        store.create(&record("h1", "WXYZ-2345")).await.unwrap();

        let approved = store
            .transition("WXYZ-2345", DeviceCodeStatus::Authorized, Some("user-1"))
            .await
            .unwrap();
        assert_eq!(approved.status, DeviceCodeStatus::Authorized);
        assert_eq!(approved.user_id.as_deref(), Some("user-1"));

        let denied = store
            .transition("WXYZ-2345", DeviceCodeStatus::Denied, None)
            .await;
        assert!(matches!(denied, Err(AuthError::InvalidGrant { .. })));
    }

    #[tokio::test]
    async fn test_transition_unknown_user_code() {
        let store = InMemoryDeviceCodeStorage::new();
        let result = store
            .transition("ZZZZ-9999", DeviceCodeStatus::Authorized, Some("user-1"))
            .await;
        assert!(matches!(result, Err(AuthError::InvalidGrant { .. })));
    }

    #[tokio::test]
    async fn test_mark_polled() {
        let store = InMemoryDeviceCodeStorage::new();
        store.create(&record("h1", "WXYZ-2345")).await.unwrap();

        let at = OffsetDateTime::now_utc();
        store.mark_polled("h1", at).await.unwrap();

        let stored = store.find_by_device_code_hash("h1").await.unwrap().unwrap();
        assert_eq!(stored.last_polled_at, Some(at));
    }
}
