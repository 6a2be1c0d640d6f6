//! User consent storage trait.

use async_trait::async_trait;

use crate::AuthResult;
use crate::types::UserConsent;

/// Storage trait for user consent records.
///
/// There is at most one consent record per (user, client) pair; granting
/// again replaces the scope set and clears any revocation marker.
#[async_trait]
pub trait ConsentStorage: Send + Sync {
    /// Creates or replaces the consent record for the (user, client) pair.
    ///
    /// # Errors
    ///
    /// Returns an error if the storage operation fails.
    async fn upsert(&self, consent: &UserConsent) -> AuthResult<()>;

    /// Finds the consent record for a (user, client) pair, revoked or not.
    ///
    /// # Errors
    ///
    /// Returns an error if the storage operation fails.
    async fn find(&self, user_id: &str, client_id: &str) -> AuthResult<Option<UserConsent>>;

    /// Marks the consent record for a (user, client) pair as revoked.
    ///
    /// # Errors
    ///
    /// Returns an error if no consent record exists or the operation fails.
    async fn revoke(&self, user_id: &str, client_id: &str) -> AuthResult<()>;

    /// Lists all unrevoked consents granted by a user.
    ///
    /// # Errors
    ///
    /// Returns an error if the storage operation fails.
    async fn list_by_user(&self, user_id: &str) -> AuthResult<Vec<UserConsent>>;
}
