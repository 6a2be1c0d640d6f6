//! In-memory user consent store.

use std::collections::HashMap;

use async_trait::async_trait;
use tokio::sync::RwLock;

use authgate_provider::storage::ConsentStorage;
use authgate_provider::types::UserConsent;
use authgate_provider::{AuthError, AuthResult};
use time::OffsetDateTime;

/// Consent store keyed by (user, client) pair.
#[derive(Debug, Default)]
pub struct InMemoryConsentStorage {
    consents: RwLock<HashMap<(String, String), UserConsent>>,
}

impl InMemoryConsentStorage {
    /// Creates an empty consent store.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl ConsentStorage for InMemoryConsentStorage {
    async fn upsert(&self, consent: &UserConsent) -> AuthResult<()> {
        self.consents.write().await.insert(
            (consent.user_id.clone(), consent.client_id.clone()),
            consent.clone(),
        );
        Ok(())
    }

    async fn find(&self, user_id: &str, client_id: &str) -> AuthResult<Option<UserConsent>> {
        Ok(self
            .consents
            .read()
            .await
            .get(&(user_id.to_string(), client_id.to_string()))
            .cloned())
    }

    async fn revoke(&self, user_id: &str, client_id: &str) -> AuthResult<()> {
        let mut consents = self.consents.write().await;
        let consent = consents
            .get_mut(&(user_id.to_string(), client_id.to_string()))
            .ok_or_else(|| AuthError::storage("Consent not found"))?;
        consent.revoked_at = Some(OffsetDateTime::now_utc());
        Ok(())
    }

    async fn list_by_user(&self, user_id: &str) -> AuthResult<Vec<UserConsent>> {
        Ok(self
            .consents
            .read()
            .await
            .values()
            .filter(|c| c.user_id == user_id && !c.is_revoked())
            .cloned()
            .collect())
    }
}
