//! In-memory scope descriptor store.

use std::collections::HashMap;

use async_trait::async_trait;
use tokio::sync::RwLock;

use authgate_provider::storage::ScopeStorage;
use authgate_provider::types::ScopeDescriptor;
use authgate_provider::{AuthError, AuthResult};

/// Scope descriptor store keyed by scope name.
#[derive(Debug, Default)]
pub struct InMemoryScopeStorage {
    scopes: RwLock<HashMap<String, ScopeDescriptor>>,
}

impl InMemoryScopeStorage {
    /// Creates an empty scope store.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl ScopeStorage for InMemoryScopeStorage {
    async fn create(&self, scope: &ScopeDescriptor) -> AuthResult<()> {
        let mut scopes = self.scopes.write().await;
        if scopes.contains_key(&scope.name) {
            return Err(AuthError::storage(format!(
                "Scope {} already defined",
                scope.name
            )));
        }
        scopes.insert(scope.name.clone(), scope.clone());
        Ok(())
    }

    async fn find_by_name(&self, name: &str) -> AuthResult<Option<ScopeDescriptor>> {
        Ok(self.scopes.read().await.get(name).cloned())
    }

    async fn update(&self, scope: &ScopeDescriptor) -> AuthResult<()> {
        let mut scopes = self.scopes.write().await;
        let entry = scopes
            .get_mut(&scope.name)
            .ok_or_else(|| AuthError::storage(format!("Scope {} not found", scope.name)))?;
        *entry = scope.clone();
        Ok(())
    }

    async fn delete(&self, name: &str) -> AuthResult<()> {
        let mut scopes = self.scopes.write().await;
        let scope = scopes
            .get(name)
            .ok_or_else(|| AuthError::storage(format!("Scope {name} not found")))?;
        if scope.is_system {
            return Err(AuthError::invalid_request(format!(
                "Scope {name} is a system scope and cannot be deleted"
            )));
        }
        scopes.remove(name);
        Ok(())
    }

    async fn list(&self) -> AuthResult<Vec<ScopeDescriptor>> {
        let mut all: Vec<ScopeDescriptor> =
            self.scopes.read().await.values().cloned().collect();
        all.sort_by(|a, b| a.name.cmp(&b.name));
        Ok(all)
    }
}
