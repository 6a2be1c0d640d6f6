//! Authorization code storage trait.
//!
//! # Security Considerations
//!
//! - Codes are stored as SHA-256 hashes only
//! - Consumption must be atomic: a code is exchanged at most once even
//!   under concurrent requests

use async_trait::async_trait;

use crate::AuthResult;
use crate::types::AuthorizationCode;

/// Storage trait for authorization codes.
#[async_trait]
pub trait AuthorizationCodeStorage: Send + Sync {
    /// Stores a new authorization code.
    ///
    /// # Errors
    ///
    /// Returns an error if the storage operation fails.
    async fn create(&self, code: &AuthorizationCode) -> AuthResult<()>;

    /// Finds a code by its hash, regardless of use or expiry.
    ///
    /// # Errors
    ///
    /// Returns an error if the storage operation fails.
    async fn find_by_hash(&self, code_hash: &str) -> AuthResult<Option<AuthorizationCode>>;

    /// Atomically consumes a code: marks it used and returns its prior state.
    ///
    /// The check-and-flip of the `used` flag must happen in a single atomic
    /// step so that concurrent exchanges of the same code see exactly one
    /// winner. In SQL this is typically:
    ///
    /// ```sql
    /// UPDATE authorization_codes
    /// SET used = TRUE
    /// WHERE code_hash = $1 AND used = FALSE AND expires_at > NOW()
    /// RETURNING *;
    /// ```
    ///
    /// # Errors
    ///
    /// Returns `InvalidGrant` if the code is not found, already used, or
    /// expired.
    async fn consume(&self, code_hash: &str) -> AuthResult<AuthorizationCode>;

    /// Deletes expired codes.
    ///
    /// # Errors
    ///
    /// Returns an error if the cleanup operation fails.
    async fn cleanup_expired(&self) -> AuthResult<u64>;
}
