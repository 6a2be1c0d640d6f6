//! Access and refresh token storage traits.
//!
//! # Security Considerations
//!
//! - Tokens are stored as SHA-256 hashes only
//! - Revocation must be atomic and immediate
//! - Expired tokens should be cleaned up periodically

use async_trait::async_trait;
use uuid::Uuid;

use crate::AuthResult;
use crate::types::{AccessTokenRecord, RefreshTokenRecord};

/// Storage trait for access token records.
#[async_trait]
pub trait AccessTokenStorage: Send + Sync {
    /// Stores a new access token record.
    ///
    /// # Errors
    ///
    /// Returns an error if the storage operation fails.
    async fn create(&self, token: &AccessTokenRecord) -> AuthResult<()>;

    /// Finds an access token by its hash.
    ///
    /// Returns records regardless of expiration or revocation status;
    /// callers should check `is_valid()` before trusting the token.
    ///
    /// # Errors
    ///
    /// Returns an error if the storage operation fails.
    async fn find_by_hash(&self, token_hash: &str) -> AuthResult<Option<AccessTokenRecord>>;

    /// Finds an access token by its record ID.
    ///
    /// # Errors
    ///
    /// Returns an error if the storage operation fails.
    async fn find_by_id(&self, id: Uuid) -> AuthResult<Option<AccessTokenRecord>>;

    /// Revokes an access token by flipping it inactive.
    ///
    /// Revoking an already revoked token is a no-op, not an error.
    ///
    /// # Errors
    ///
    /// Returns an error if the token is not found or the operation fails.
    async fn revoke(&self, token_hash: &str) -> AuthResult<()>;

    /// Revokes all access tokens held by a user for a client.
    ///
    /// # Errors
    ///
    /// Returns an error if the operation fails.
    async fn revoke_by_user_and_client(&self, user_id: &str, client_id: &str) -> AuthResult<u64>;

    /// Deletes expired token records.
    ///
    /// # Errors
    ///
    /// Returns an error if the cleanup operation fails.
    async fn cleanup_expired(&self) -> AuthResult<u64>;
}

/// Storage trait for refresh token records.
#[async_trait]
pub trait RefreshTokenStorage: Send + Sync {
    /// Stores a new refresh token record.
    ///
    /// # Errors
    ///
    /// Returns an error if the storage operation fails.
    async fn create(&self, token: &RefreshTokenRecord) -> AuthResult<()>;

    /// Finds a refresh token by its hash.
    ///
    /// Returns records regardless of expiration or revocation status;
    /// callers should check `is_valid()` before trusting the token.
    ///
    /// # Errors
    ///
    /// Returns an error if the storage operation fails.
    async fn find_by_hash(&self, token_hash: &str) -> AuthResult<Option<RefreshTokenRecord>>;

    /// Atomically consumes a refresh token for rotation: revokes it and
    /// returns its prior state.
    ///
    /// The check-and-revoke must happen in a single atomic step so a
    /// refresh token rotates at most once even under concurrent requests.
    /// In SQL this is typically:
    ///
    /// ```sql
    /// UPDATE oauth_refresh_tokens
    /// SET is_active = FALSE, revoked_at = NOW()
    /// WHERE token_hash = $1 AND is_active = TRUE AND expires_at > NOW()
    /// RETURNING *;
    /// ```
    ///
    /// # Errors
    ///
    /// Returns `InvalidGrant` if the token is not found, already revoked,
    /// or expired.
    async fn consume(&self, token_hash: &str) -> AuthResult<RefreshTokenRecord>;

    /// Revokes a refresh token by flipping it inactive.
    ///
    /// Revoking an already revoked token is a no-op, not an error.
    ///
    /// # Errors
    ///
    /// Returns an error if the token is not found or the operation fails.
    async fn revoke(&self, token_hash: &str) -> AuthResult<()>;

    /// Revokes all refresh tokens held by a user for a client.
    ///
    /// # Errors
    ///
    /// Returns an error if the operation fails.
    async fn revoke_by_user_and_client(&self, user_id: &str, client_id: &str) -> AuthResult<u64>;

    /// Deletes expired token records.
    ///
    /// # Errors
    ///
    /// Returns an error if the cleanup operation fails.
    async fn cleanup_expired(&self) -> AuthResult<u64>;
}
