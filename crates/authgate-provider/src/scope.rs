//! Scope descriptor service.
//!
//! Registration, lookup, update, deletion, and listing of scope
//! descriptors. The service owns the deletion rules, so every storage
//! backend inherits them: unknown scopes are rejected, and system scopes
//! cannot be deleted.

use std::sync::Arc;

use crate::AuthResult;
use crate::error::AuthError;
use crate::storage::ScopeStorage;
use crate::types::ScopeDescriptor;

/// Service for managing scope descriptors.
pub struct ScopeService {
    storage: Arc<dyn ScopeStorage>,
}

impl ScopeService {
    /// Creates a new scope service.
    #[must_use]
    pub fn new(storage: Arc<dyn ScopeStorage>) -> Self {
        Self { storage }
    }

    /// Registers a new scope descriptor.
    ///
    /// # Errors
    ///
    /// Returns `InvalidRequest` if the name is empty or contains
    /// whitespace, or a storage error (including duplicate names).
    pub async fn create(&self, scope: ScopeDescriptor) -> AuthResult<ScopeDescriptor> {
        if scope.name.is_empty() || scope.name.contains(char::is_whitespace) {
            return Err(AuthError::invalid_request(
                "Scope name must be a single non-empty token",
            ));
        }
        self.storage.create(&scope).await?;
        Ok(scope)
    }

    /// Looks up a scope descriptor by name.
    ///
    /// # Errors
    ///
    /// Returns a storage error if the lookup fails.
    pub async fn find_by_name(&self, name: &str) -> AuthResult<Option<ScopeDescriptor>> {
        self.storage.find_by_name(name).await
    }

    /// Replaces a stored scope descriptor.
    ///
    /// # Errors
    ///
    /// Returns an error if the scope is not found or storage fails.
    pub async fn update(&self, scope: &ScopeDescriptor) -> AuthResult<()> {
        self.storage.update(scope).await
    }

    /// Deletes a scope descriptor by name.
    ///
    /// # Errors
    ///
    /// Returns `InvalidRequest` if the scope does not exist,
    /// `UnsupportedOperation` if it is a system scope, or a storage error.
    pub async fn delete(&self, name: &str) -> AuthResult<()> {
        let scope = self
            .storage
            .find_by_name(name)
            .await?
            .ok_or_else(|| AuthError::invalid_request(format!("Unknown scope: {name}")))?;

        if scope.is_system {
            return Err(AuthError::unsupported_operation(format!(
                "Scope {name} is a system scope and cannot be deleted"
            )));
        }

        self.storage.delete(name).await
    }

    /// Lists all scope descriptors.
    ///
    /// # Errors
    ///
    /// Returns a storage error if the listing fails.
    pub async fn list(&self) -> AuthResult<Vec<ScopeDescriptor>> {
        self.storage.list().await
    }
}

#[cfg(test)]
mod tests {
    use std::collections::HashMap;
    use std::sync::RwLock;

    use async_trait::async_trait;

    use super::*;

    #[derive(Default)]
    struct MockScopeStorage {
        scopes: RwLock<HashMap<String, ScopeDescriptor>>,
    }

    #[async_trait]
    impl ScopeStorage for MockScopeStorage {
        async fn create(&self, scope: &ScopeDescriptor) -> AuthResult<()> {
            let mut scopes = self.scopes.write().unwrap();
            if scopes.contains_key(&scope.name) {
                return Err(AuthError::invalid_request(format!(
                    "Scope already exists: {}",
                    scope.name
                )));
            }
            scopes.insert(scope.name.clone(), scope.clone());
            Ok(())
        }

        async fn find_by_name(&self, name: &str) -> AuthResult<Option<ScopeDescriptor>> {
            Ok(self.scopes.read().unwrap().get(name).cloned())
        }

        async fn update(&self, scope: &ScopeDescriptor) -> AuthResult<()> {
            self.scopes
                .write()
                .unwrap()
                .insert(scope.name.clone(), scope.clone());
            Ok(())
        }

        async fn delete(&self, name: &str) -> AuthResult<()> {
            self.scopes.write().unwrap().remove(name);
            Ok(())
        }

        async fn list(&self) -> AuthResult<Vec<ScopeDescriptor>> {
            Ok(self.scopes.read().unwrap().values().cloned().collect())
        }
    }

    fn service() -> ScopeService {
        ScopeService::new(Arc::new(MockScopeStorage::default()))
    }

    #[tokio::test]
    async fn test_delete_rejects_system_scope() {
        let service = service();
        let mut openid = ScopeDescriptor::new("openid", "OpenID Connect");
        openid.is_system = true;
        service.create(openid).await.unwrap();

        let err = service.delete("openid").await.unwrap_err();
        assert!(err.to_string().contains("system scope"));
        assert!(service.find_by_name("openid").await.unwrap().is_some());
    }

    #[tokio::test]
    async fn test_delete_removes_regular_scope() {
        let service = service();
        service
            .create(ScopeDescriptor::new("api:read", "Read API access"))
            .await
            .unwrap();

        service.delete("api:read").await.unwrap();
        assert!(service.find_by_name("api:read").await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_delete_unknown_scope_is_invalid_request() {
        let err = service().delete("nope").await.unwrap_err();
        assert!(err.to_string().contains("Unknown scope"));
    }

    #[tokio::test]
    async fn test_create_rejects_name_with_whitespace() {
        let err = service()
            .create(ScopeDescriptor::new("api read", "Broken"))
            .await
            .unwrap_err();
        assert!(err.to_string().contains("non-empty token"));
    }
}
