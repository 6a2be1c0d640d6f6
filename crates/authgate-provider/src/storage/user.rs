//! External user store trait.

use async_trait::async_trait;

use crate::AuthResult;
use crate::types::User;

/// Read-only view into the surrounding application's user store.
///
/// The authorization server never creates or mutates users; it resolves
/// subjects for ID token claims and the userinfo projection.
#[async_trait]
pub trait UserStorage: Send + Sync {
    /// Finds a user by subject identifier.
    ///
    /// # Errors
    ///
    /// Returns an error if the storage operation fails.
    async fn find_by_id(&self, user_id: &str) -> AuthResult<Option<User>>;
}
