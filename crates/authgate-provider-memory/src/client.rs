//! In-memory client registration store.

use std::collections::HashMap;

use async_trait::async_trait;
use tokio::sync::RwLock;
use uuid::Uuid;

use authgate_provider::storage::ClientStorage;
use authgate_provider::types::Client;
use authgate_provider::{AuthError, AuthResult};

/// Client store keyed by public `client_id`.
#[derive(Debug, Default)]
pub struct InMemoryClientStorage {
    clients: RwLock<HashMap<String, Client>>,
}

impl InMemoryClientStorage {
    /// Creates an empty client store.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl ClientStorage for InMemoryClientStorage {
    async fn create(&self, client: &Client) -> AuthResult<()> {
        let mut clients = self.clients.write().await;
        if clients.contains_key(&client.client_id) {
            return Err(AuthError::storage(format!(
                "Client {} already registered",
                client.client_id
            )));
        }
        clients.insert(client.client_id.clone(), client.clone());
        Ok(())
    }

    async fn find_by_client_id(&self, client_id: &str) -> AuthResult<Option<Client>> {
        Ok(self.clients.read().await.get(client_id).cloned())
    }

    async fn find_by_id(&self, id: Uuid) -> AuthResult<Option<Client>> {
        Ok(self
            .clients
            .read()
            .await
            .values()
            .find(|c| c.id == id)
            .cloned())
    }

    async fn update(&self, client: &Client) -> AuthResult<()> {
        let mut clients = self.clients.write().await;
        let entry = clients
            .get_mut(&client.client_id)
            .ok_or_else(|| AuthError::storage(format!("Client {} not found", client.client_id)))?;
        *entry = client.clone();
        Ok(())
    }

    async fn delete(&self, client_id: &str) -> AuthResult<()> {
        self.clients
            .write()
            .await
            .remove(client_id)
            .map(|_| ())
            .ok_or_else(|| AuthError::storage(format!("Client {client_id} not found")))
    }

    async fn list(&self, limit: i64, offset: i64) -> AuthResult<Vec<Client>> {
        let clients = self.clients.read().await;
        let mut all: Vec<Client> = clients.values().cloned().collect();
        all.sort_by(|a, b| a.created_at.cmp(&b.created_at).then(a.client_id.cmp(&b.client_id)));

        let offset = usize::try_from(offset).unwrap_or(0);
        let limit = usize::try_from(limit).unwrap_or(0);
        Ok(all.into_iter().skip(offset).take(limit).collect())
    }
}
