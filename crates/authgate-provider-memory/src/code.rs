//! In-memory authorization code store.

use std::collections::HashMap;

use async_trait::async_trait;
use tokio::sync::RwLock;

use authgate_provider::storage::AuthorizationCodeStorage;
use authgate_provider::types::AuthorizationCode;
use authgate_provider::{AuthError, AuthResult};

/// Authorization code store keyed by code hash.
#[derive(Debug, Default)]
pub struct InMemoryAuthorizationCodeStorage {
    codes: RwLock<HashMap<String, AuthorizationCode>>,
}

impl InMemoryAuthorizationCodeStorage {
    /// Creates an empty code store.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl AuthorizationCodeStorage for InMemoryAuthorizationCodeStorage {
    async fn create(&self, code: &AuthorizationCode) -> AuthResult<()> {
        self.codes
            .write()
            .await
            .insert(code.code_hash.clone(), code.clone());
        Ok(())
    }

    async fn find_by_hash(&self, code_hash: &str) -> AuthResult<Option<AuthorizationCode>> {
        Ok(self.codes.read().await.get(code_hash).cloned())
    }

    async fn consume(&self, code_hash: &str) -> AuthResult<AuthorizationCode> {
        // Check and flip under one write guard so concurrent exchanges of
        // the same code see exactly one winner
        let mut codes = self.codes.write().await;
        let code = codes
            .get_mut(code_hash)
            .ok_or_else(|| AuthError::invalid_grant("Invalid authorization code"))?;
        if code.used || code.is_expired() {
            return Err(AuthError::invalid_grant("Invalid authorization code"));
        }
        code.used = true;
        Ok(code.clone())
    }

    async fn cleanup_expired(&self) -> AuthResult<u64> {
        let mut codes = self.codes.write().await;
        let before = codes.len();
        codes.retain(|_, c| !c.is_expired());
        Ok((before - codes.len()) as u64)
    }
}
