//! Scope descriptor storage trait.

use async_trait::async_trait;

use crate::AuthResult;
use crate::types::ScopeDescriptor;

/// Storage trait for scope descriptors.
#[async_trait]
pub trait ScopeStorage: Send + Sync {
    /// Stores a new scope descriptor.
    ///
    /// # Errors
    ///
    /// Returns an error if a scope with the same name exists or the
    /// operation fails.
    async fn create(&self, scope: &ScopeDescriptor) -> AuthResult<()>;

    /// Finds a scope descriptor by name.
    ///
    /// # Errors
    ///
    /// Returns an error if the storage operation fails.
    async fn find_by_name(&self, name: &str) -> AuthResult<Option<ScopeDescriptor>>;

    /// Replaces a stored scope descriptor.
    ///
    /// # Errors
    ///
    /// Returns an error if the scope is not found or the operation fails.
    async fn update(&self, scope: &ScopeDescriptor) -> AuthResult<()>;

    /// Deletes a scope descriptor by name.
    ///
    /// System scopes (`is_system`) must be rejected.
    ///
    /// # Errors
    ///
    /// Returns an error if the scope is not found, is a system scope, or
    /// the operation fails.
    async fn delete(&self, name: &str) -> AuthResult<()>;

    /// Lists all scope descriptors.
    ///
    /// # Errors
    ///
    /// Returns an error if the storage operation fails.
    async fn list(&self) -> AuthResult<Vec<ScopeDescriptor>>;
}
