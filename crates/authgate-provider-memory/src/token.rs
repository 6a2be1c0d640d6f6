//! In-memory access and refresh token stores.

use std::collections::HashMap;

use async_trait::async_trait;
use time::OffsetDateTime;
use tokio::sync::RwLock;
use uuid::Uuid;

use authgate_provider::storage::{AccessTokenStorage, RefreshTokenStorage};
use authgate_provider::types::{AccessTokenRecord, RefreshTokenRecord};
use authgate_provider::{AuthError, AuthResult};

/// Access token store keyed by token hash.
#[derive(Debug, Default)]
pub struct InMemoryAccessTokenStorage {
    tokens: RwLock<HashMap<String, AccessTokenRecord>>,
}

impl InMemoryAccessTokenStorage {
    /// Creates an empty access token store.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl AccessTokenStorage for InMemoryAccessTokenStorage {
    async fn create(&self, token: &AccessTokenRecord) -> AuthResult<()> {
        self.tokens
            .write()
            .await
            .insert(token.token_hash.clone(), token.clone());
        Ok(())
    }

    async fn find_by_hash(&self, token_hash: &str) -> AuthResult<Option<AccessTokenRecord>> {
        Ok(self.tokens.read().await.get(token_hash).cloned())
    }

    async fn find_by_id(&self, id: Uuid) -> AuthResult<Option<AccessTokenRecord>> {
        Ok(self
            .tokens
            .read()
            .await
            .values()
            .find(|t| t.id == id)
            .cloned())
    }

    async fn revoke(&self, token_hash: &str) -> AuthResult<()> {
        let mut tokens = self.tokens.write().await;
        let token = tokens
            .get_mut(token_hash)
            .ok_or_else(|| AuthError::storage("Access token not found"))?;
        if token.is_active {
            token.is_active = false;
            token.revoked_at = Some(OffsetDateTime::now_utc());
        }
        Ok(())
    }

    async fn revoke_by_user_and_client(&self, user_id: &str, client_id: &str) -> AuthResult<u64> {
        let mut tokens = self.tokens.write().await;
        let mut count = 0u64;
        for token in tokens.values_mut() {
            if token.user_id.as_deref() == Some(user_id)
                && token.client_id == client_id
                && token.is_active
            {
                token.is_active = false;
                token.revoked_at = Some(OffsetDateTime::now_utc());
                count += 1;
            }
        }
        Ok(count)
    }

    async fn cleanup_expired(&self) -> AuthResult<u64> {
        let mut tokens = self.tokens.write().await;
        let before = tokens.len();
        tokens.retain(|_, t| !t.is_expired());
        Ok((before - tokens.len()) as u64)
    }
}

/// Refresh token store keyed by token hash.
#[derive(Debug, Default)]
pub struct InMemoryRefreshTokenStorage {
    tokens: RwLock<HashMap<String, RefreshTokenRecord>>,
}

impl InMemoryRefreshTokenStorage {
    /// Creates an empty refresh token store.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl RefreshTokenStorage for InMemoryRefreshTokenStorage {
    async fn create(&self, token: &RefreshTokenRecord) -> AuthResult<()> {
        self.tokens
            .write()
            .await
            .insert(token.token_hash.clone(), token.clone());
        Ok(())
    }

    async fn find_by_hash(&self, token_hash: &str) -> AuthResult<Option<RefreshTokenRecord>> {
        Ok(self.tokens.read().await.get(token_hash).cloned())
    }

    async fn consume(&self, token_hash: &str) -> AuthResult<RefreshTokenRecord> {
        // Check and revoke under one write guard so a token rotates at most
        // once under concurrent refreshes
        let mut tokens = self.tokens.write().await;
        let token = tokens
            .get_mut(token_hash)
            .ok_or_else(|| AuthError::invalid_grant("Invalid refresh token"))?;
        if !token.is_valid() {
            return Err(AuthError::invalid_grant("Invalid refresh token"));
        }
        token.is_active = false;
        token.revoked_at = Some(OffsetDateTime::now_utc());
        Ok(token.clone())
    }

    async fn revoke(&self, token_hash: &str) -> AuthResult<()> {
        let mut tokens = self.tokens.write().await;
        let token = tokens
            .get_mut(token_hash)
            .ok_or_else(|| AuthError::storage("Refresh token not found"))?;
        if token.is_active {
            token.is_active = false;
            token.revoked_at = Some(OffsetDateTime::now_utc());
        }
        Ok(())
    }

    async fn revoke_by_user_and_client(&self, user_id: &str, client_id: &str) -> AuthResult<u64> {
        let mut tokens = self.tokens.write().await;
        let mut count = 0u64;
        for token in tokens.values_mut() {
            if token.user_id.as_deref() == Some(user_id)
                && token.client_id == client_id
                && token.is_active
            {
                token.is_active = false;
                token.revoked_at = Some(OffsetDateTime::now_utc());
                count += 1;
            }
        }
        Ok(count)
    }

    async fn cleanup_expired(&self) -> AuthResult<u64> {
        let mut tokens = self.tokens.write().await;
        let before = tokens.len();
        tokens.retain(|_, t| !t.is_expired());
        Ok((before - tokens.len()) as u64)
    }
}
