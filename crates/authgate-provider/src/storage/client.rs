//! Client storage trait.

use async_trait::async_trait;
use uuid::Uuid;

use crate::AuthResult;
use crate::types::Client;

/// Storage trait for OAuth client registrations.
///
/// Lookups return records regardless of the `is_active` flag; callers
/// decide whether an inactive client is an error for their operation.
#[async_trait]
pub trait ClientStorage: Send + Sync {
    /// Stores a new client registration.
    ///
    /// # Errors
    ///
    /// Returns an error if the `client_id` already exists or the storage
    /// operation fails.
    async fn create(&self, client: &Client) -> AuthResult<()>;

    /// Finds a client by its public `client_id`.
    ///
    /// # Errors
    ///
    /// Returns an error if the storage operation fails.
    async fn find_by_client_id(&self, client_id: &str) -> AuthResult<Option<Client>>;

    /// Finds a client by its internal record ID.
    ///
    /// # Errors
    ///
    /// Returns an error if the storage operation fails.
    async fn find_by_id(&self, id: Uuid) -> AuthResult<Option<Client>>;

    /// Replaces a stored client registration.
    ///
    /// # Errors
    ///
    /// Returns an error if the client is not found or the operation fails.
    async fn update(&self, client: &Client) -> AuthResult<()>;

    /// Deletes a client registration.
    ///
    /// # Errors
    ///
    /// Returns an error if the client is not found or the operation fails.
    async fn delete(&self, client_id: &str) -> AuthResult<()>;

    /// Lists registered clients with pagination.
    ///
    /// # Errors
    ///
    /// Returns an error if the storage operation fails.
    async fn list(&self, limit: i64, offset: i64) -> AuthResult<Vec<Client>>;
}
