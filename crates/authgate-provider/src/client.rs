//! Client registry service.
//!
//! Registration, lookup, update, deletion, secret rotation, and credential
//! verification for OAuth clients.
//!
//! # Security
//!
//! - Client secrets are Argon2id-hashed at registration; the plaintext is
//!   returned exactly once
//! - Credential verification failures are indistinguishable: unknown client,
//!   inactive client, and wrong secret all produce the same `invalid_client`
//!   error

use std::sync::Arc;

use time::OffsetDateTime;
use uuid::Uuid;

use crate::AuthResult;
use crate::audit::{AuditEvent, AuditEventKind, AuditSink};
use crate::error::AuthError;
use crate::secret::{
    generate_client_id, generate_client_secret, hash_client_secret, verify_client_secret,
};
use crate::storage::ClientStorage;
use crate::types::{
    Client, ClientType, CreateClientRequest, CreateClientResponse, UpdateClientRequest,
};

/// Service for managing OAuth client registrations.
pub struct ClientService {
    storage: Arc<dyn ClientStorage>,
    audit_sink: Option<Arc<dyn AuditSink>>,
}

impl ClientService {
    /// Creates a new client service.
    #[must_use]
    pub fn new(storage: Arc<dyn ClientStorage>) -> Self {
        Self {
            storage,
            audit_sink: None,
        }
    }

    /// Attaches an audit sink.
    #[must_use]
    pub fn with_audit_sink(mut self, sink: Arc<dyn AuditSink>) -> Self {
        self.audit_sink = Some(sink);
        self
    }

    /// Registers a new client.
    ///
    /// Generates the `client_id` and, for confidential clients, a secret
    /// whose plaintext appears only in the returned response.
    ///
    /// # Errors
    ///
    /// Returns `InvalidRequest` if the resulting registration fails
    /// validation, or a storage error.
    pub async fn register(&self, request: CreateClientRequest) -> AuthResult<CreateClientResponse> {
        let (client_secret, client_secret_hash) = match request.client_type {
            ClientType::Confidential => {
                let secret = generate_client_secret();
                let hash = hash_client_secret(&secret)
                    .map_err(|e| AuthError::internal(format!("Secret hashing failed: {e}")))?;
                (Some(secret), Some(hash))
            }
            ClientType::Public => (None, None),
        };

        let now = OffsetDateTime::now_utc();
        let client = Client {
            id: Uuid::new_v4(),
            client_id: generate_client_id(),
            client_secret_hash,
            name: request.name,
            description: request.description,
            logo_url: request.logo_url,
            client_type: request.client_type,
            redirect_uris: request.redirect_uris,
            allowed_grant_types: request.allowed_grant_types,
            allowed_scopes: request.allowed_scopes,
            default_scopes: request.default_scopes,
            access_token_lifetime: request.access_token_lifetime,
            refresh_token_lifetime: request.refresh_token_lifetime,
            id_token_lifetime: request.id_token_lifetime,
            require_pkce: request
                .require_pkce
                .unwrap_or(request.client_type == ClientType::Public),
            require_consent: request.require_consent.unwrap_or(true),
            first_party: request.first_party.unwrap_or(false),
            owner_id: request.owner_id,
            is_active: true,
            created_at: now,
            updated_at: now,
        };

        client
            .validate()
            .map_err(|e| AuthError::invalid_request(e.to_string()))?;

        self.storage.create(&client).await?;

        self.audit(
            AuditEvent::new(AuditEventKind::ClientCreated).with_client(&client.client_id),
        )
        .await;

        Ok(CreateClientResponse {
            client,
            client_secret,
        })
    }

    /// Looks up a client by `client_id`.
    ///
    /// # Errors
    ///
    /// Returns `InvalidClient` if no such client exists.
    pub async fn get(&self, client_id: &str) -> AuthResult<Client> {
        self.storage
            .find_by_client_id(client_id)
            .await?
            .ok_or_else(|| AuthError::invalid_client("Client authentication failed"))
    }

    /// Applies a partial update to a client registration.
    ///
    /// # Errors
    ///
    /// Returns `InvalidClient` if the client does not exist, or
    /// `InvalidRequest` if the updated registration fails validation.
    pub async fn update(
        &self,
        client_id: &str,
        request: UpdateClientRequest,
    ) -> AuthResult<Client> {
        let mut client = self.get(client_id).await?;

        if let Some(name) = request.name {
            client.name = name;
        }
        if let Some(description) = request.description {
            client.description = Some(description);
        }
        if let Some(logo_url) = request.logo_url {
            client.logo_url = Some(logo_url);
        }
        if let Some(redirect_uris) = request.redirect_uris {
            client.redirect_uris = redirect_uris;
        }
        if let Some(grant_types) = request.allowed_grant_types {
            client.allowed_grant_types = grant_types;
        }
        if let Some(scopes) = request.allowed_scopes {
            client.allowed_scopes = scopes;
        }
        if let Some(default_scopes) = request.default_scopes {
            client.default_scopes = default_scopes;
        }
        if let Some(lifetime) = request.access_token_lifetime {
            client.access_token_lifetime = Some(lifetime);
        }
        if let Some(lifetime) = request.refresh_token_lifetime {
            client.refresh_token_lifetime = Some(lifetime);
        }
        if let Some(lifetime) = request.id_token_lifetime {
            client.id_token_lifetime = Some(lifetime);
        }
        if let Some(require_pkce) = request.require_pkce {
            client.require_pkce = require_pkce;
        }
        if let Some(require_consent) = request.require_consent {
            client.require_consent = require_consent;
        }
        if let Some(is_active) = request.is_active {
            client.is_active = is_active;
        }
        client.updated_at = OffsetDateTime::now_utc();

        client
            .validate()
            .map_err(|e| AuthError::invalid_request(e.to_string()))?;

        self.storage.update(&client).await?;

        self.audit(AuditEvent::new(AuditEventKind::ClientUpdated).with_client(client_id))
            .await;

        Ok(client)
    }

    /// Deletes a client registration.
    ///
    /// # Errors
    ///
    /// Returns `InvalidClient` if the client does not exist.
    pub async fn delete(&self, client_id: &str) -> AuthResult<()> {
        // Lookup first so a missing client reports cleanly
        self.get(client_id).await?;
        self.storage.delete(client_id).await?;

        self.audit(AuditEvent::new(AuditEventKind::ClientDeleted).with_client(client_id))
            .await;

        Ok(())
    }

    /// Lists registered clients with pagination.
    ///
    /// # Errors
    ///
    /// Returns a storage error on failure.
    pub async fn list(&self, limit: i64, offset: i64) -> AuthResult<Vec<Client>> {
        self.storage.list(limit, offset).await
    }

    /// Rotates a confidential client's secret.
    ///
    /// The old secret stops verifying immediately. Returns the updated
    /// client and the new plaintext secret, which appears only here.
    ///
    /// # Errors
    ///
    /// Returns `UnsupportedOperation` for public clients and
    /// `InvalidClient` if the client does not exist.
    pub async fn rotate_secret(&self, client_id: &str) -> AuthResult<(Client, String)> {
        let mut client = self.get(client_id).await?;

        if client.client_type == ClientType::Public {
            return Err(AuthError::unsupported_operation(
                "Public clients have no secret to rotate",
            ));
        }

        let secret = generate_client_secret();
        client.client_secret_hash = Some(
            hash_client_secret(&secret)
                .map_err(|e| AuthError::internal(format!("Secret hashing failed: {e}")))?,
        );
        client.updated_at = OffsetDateTime::now_utc();

        self.storage.update(&client).await?;

        self.audit(AuditEvent::new(AuditEventKind::ClientSecretRotated).with_client(client_id))
            .await;

        Ok((client, secret))
    }

    /// Verifies client credentials for the token endpoint.
    ///
    /// Confidential clients must present the correct secret. Public clients
    /// authenticate by `client_id` alone and must not send a secret.
    ///
    /// # Errors
    ///
    /// Returns the same undifferentiated `InvalidClient` for every failure
    /// mode so callers cannot probe which part was wrong.
    pub async fn verify_credentials(
        &self,
        client_id: &str,
        client_secret: Option<&str>,
    ) -> AuthResult<Client> {
        let invalid = || AuthError::invalid_client("Client authentication failed");

        let client = self
            .storage
            .find_by_client_id(client_id)
            .await?
            .ok_or_else(invalid)?;

        if !client.is_active {
            return Err(invalid());
        }

        match client.client_type {
            ClientType::Confidential => {
                let secret = client_secret.ok_or_else(invalid)?;
                let hash = client.client_secret_hash.as_deref().ok_or_else(invalid)?;
                if !verify_client_secret(secret, hash).unwrap_or(false) {
                    return Err(invalid());
                }
            }
            ClientType::Public => {
                if client_secret.is_some() {
                    return Err(invalid());
                }
            }
        }

        Ok(client)
    }

    async fn audit(&self, event: AuditEvent) {
        if let Some(ref sink) = self.audit_sink {
            sink.record(event).await;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::GrantType;
    use std::collections::HashMap;
    use std::sync::RwLock;

    struct MockClientStorage {
        clients: RwLock<HashMap<String, Client>>,
    }

    impl MockClientStorage {
        fn new() -> Self {
            Self {
                clients: RwLock::new(HashMap::new()),
            }
        }
    }

    #[async_trait::async_trait]
    impl ClientStorage for MockClientStorage {
        async fn create(&self, client: &Client) -> AuthResult<()> {
            self.clients
                .write()
                .unwrap()
                .insert(client.client_id.clone(), client.clone());
            Ok(())
        }

        async fn find_by_client_id(&self, client_id: &str) -> AuthResult<Option<Client>> {
            Ok(self.clients.read().unwrap().get(client_id).cloned())
        }

        async fn find_by_id(&self, id: Uuid) -> AuthResult<Option<Client>> {
            Ok(self
                .clients
                .read()
                .unwrap()
                .values()
                .find(|c| c.id == id)
                .cloned())
        }

        async fn update(&self, client: &Client) -> AuthResult<()> {
            self.clients
                .write()
                .unwrap()
                .insert(client.client_id.clone(), client.clone());
            Ok(())
        }

        async fn delete(&self, client_id: &str) -> AuthResult<()> {
            self.clients.write().unwrap().remove(client_id);
            Ok(())
        }

        async fn list(&self, _limit: i64, _offset: i64) -> AuthResult<Vec<Client>> {
            Ok(self.clients.read().unwrap().values().cloned().collect())
        }
    }

    fn service() -> ClientService {
        ClientService::new(Arc::new(MockClientStorage::new()))
    }

    fn confidential_request() -> CreateClientRequest {
        CreateClientRequest {
            name: "Backend Service".to_string(),
            description: None,
            logo_url: None,
            client_type: ClientType::Confidential,
            redirect_uris: vec!["https://app.example.com/callback".to_string()],
            allowed_grant_types: vec![
                GrantType::AuthorizationCode,
                GrantType::ClientCredentials,
                GrantType::RefreshToken,
            ],
            allowed_scopes: vec!["openid".to_string(), "api:read".to_string()],
            default_scopes: vec!["api:read".to_string()],
            access_token_lifetime: None,
            refresh_token_lifetime: None,
            id_token_lifetime: None,
            require_pkce: None,
            require_consent: None,
            first_party: None,
            owner_id: None,
        }
    }

    fn public_request() -> CreateClientRequest {
        CreateClientRequest {
            client_type: ClientType::Public,
            allowed_grant_types: vec![GrantType::AuthorizationCode, GrantType::RefreshToken],
            ..confidential_request()
        }
    }

    #[tokio::test]
    async fn test_register_confidential_returns_secret_once() {
        let service = service();
        let response = service.register(confidential_request()).await.unwrap();

        assert!(response.client.client_id.starts_with("agw_"));
        let secret = response.client_secret.unwrap();
        assert!(secret.starts_with("agws_"));

        // Only the hash is stored
        let stored = service.get(&response.client.client_id).await.unwrap();
        let hash = stored.client_secret_hash.unwrap();
        assert!(hash.starts_with("$argon2id$"));
        assert!(!hash.contains(&secret));
    }

    #[tokio::test]
    async fn test_register_public_has_no_secret() {
        let service = service();
        let response = service.register(public_request()).await.unwrap();

        assert!(response.client_secret.is_none());
        assert!(response.client.client_secret_hash.is_none());
        // Public clients default to requiring PKCE
        assert!(response.client.require_pkce);
    }

    #[tokio::test]
    async fn test_register_public_with_client_credentials_rejected() {
        let service = service();
        let mut request = public_request();
        request.allowed_grant_types = vec![GrantType::ClientCredentials];

        let result = service.register(request).await;
        assert!(matches!(result, Err(AuthError::InvalidRequest { .. })));
    }

    #[tokio::test]
    async fn test_update_and_deactivate() {
        let service = service();
        let response = service.register(confidential_request()).await.unwrap();
        let client_id = response.client.client_id.clone();

        let updated = service
            .update(
                &client_id,
                UpdateClientRequest {
                    name: Some("Renamed".to_string()),
                    is_active: Some(false),
                    ..UpdateClientRequest::default()
                },
            )
            .await
            .unwrap();

        assert_eq!(updated.name, "Renamed");
        assert!(!updated.is_active);
    }

    #[tokio::test]
    async fn test_delete_unknown_client() {
        let service = service();
        let result = service.delete("agw_missing").await;
        assert!(matches!(result, Err(AuthError::InvalidClient { .. })));
    }

    #[tokio::test]
    async fn test_rotate_secret_invalidates_old() {
        let service = service();
        let response = service.register(confidential_request()).await.unwrap();
        let client_id = response.client.client_id.clone();
        let old_secret = response.client_secret.unwrap();

        let (_, new_secret) = service.rotate_secret(&client_id).await.unwrap();
        assert_ne!(old_secret, new_secret);

        assert!(
            service
                .verify_credentials(&client_id, Some(&old_secret))
                .await
                .is_err()
        );
        assert!(
            service
                .verify_credentials(&client_id, Some(&new_secret))
                .await
                .is_ok()
        );
    }

    #[tokio::test]
    async fn test_rotate_secret_public_client() {
        let service = service();
        let response = service.register(public_request()).await.unwrap();

        let result = service.rotate_secret(&response.client.client_id).await;
        assert!(matches!(
            result,
            Err(AuthError::UnsupportedOperation { .. })
        ));
    }

    #[tokio::test]
    async fn test_verify_credentials_failures_are_uniform() {
        let service = service();
        let response = service.register(confidential_request()).await.unwrap();
        let client_id = response.client.client_id.clone();

        // Unknown client, missing secret, and wrong secret all look the same
        let unknown = service
            .verify_credentials("agw_missing", Some("agws_x"))
            .await
            .unwrap_err();
        let missing = service.verify_credentials(&client_id, None).await.unwrap_err();
        let wrong = service
            .verify_credentials(&client_id, Some("agws_wrong"))
            .await
            .unwrap_err();

        for err in [unknown, missing, wrong] {
            assert!(matches!(err, AuthError::InvalidClient { .. }));
            assert_eq!(err.to_string(), "Invalid client: Client authentication failed");
        }
    }

    #[tokio::test]
    async fn test_verify_credentials_public_client() {
        let service = service();
        let response = service.register(public_request()).await.unwrap();
        let client_id = response.client.client_id.clone();

        assert!(service.verify_credentials(&client_id, None).await.is_ok());
        // A public client presenting a secret is rejected
        assert!(
            service
                .verify_credentials(&client_id, Some("agws_anything"))
                .await
                .is_err()
        );
    }

    #[tokio::test]
    async fn test_verify_credentials_inactive_client() {
        let service = service();
        let response = service.register(confidential_request()).await.unwrap();
        let client_id = response.client.client_id.clone();
        let secret = response.client_secret.unwrap();

        service
            .update(
                &client_id,
                UpdateClientRequest {
                    is_active: Some(false),
                    ..UpdateClientRequest::default()
                },
            )
            .await
            .unwrap();

        let result = service.verify_credentials(&client_id, Some(&secret)).await;
        assert!(matches!(result, Err(AuthError::InvalidClient { .. })));
    }
}
