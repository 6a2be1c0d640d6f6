//! Authorization service.
//!
//! Validates OAuth 2.0 authorization requests for an already-authenticated
//! user and issues single-use authorization codes.
//!
//! # Security Requirements
//!
//! - PKCE is required for public clients and for clients registered with
//!   `require_pkce`
//! - Authorization codes are 256-bit random values, stored hashed
//! - Codes expire after a configurable time (default 10 minutes)
//!
//! # Usage
//!
//! ```ignore
//! use authgate_provider::oauth::AuthorizationService;
//!
//! let service = AuthorizationService::new(
//!     client_storage,
//!     code_storage,
//!     consent_storage,
//!     config.oauth.clone(),
//! );
//!
//! let issued = service.authorize(&request, "user-1").await?;
//! let redirect = AuthorizationResponse::new(issued.code, request.state.clone())
//!     .to_redirect_url(&request.redirect_uri)?;
//! ```

use std::sync::Arc;

use time::{Duration, OffsetDateTime};
use uuid::Uuid;

use crate::AuthResult;
use crate::audit::{AuditEvent, AuditEventKind, AuditSink};
use crate::config::OAuthConfig;
use crate::error::AuthError;
use crate::oauth::authorize::AuthorizationRequest;
use crate::oauth::pkce::{PkceChallenge, PkceChallengeMethod};
use crate::storage::{AuthorizationCodeStorage, ClientStorage, ConsentStorage};
use crate::types::{AuthorizationCode, Client, GrantType, generate_token, hash_token};

/// An issued authorization code.
///
/// The `code` field is the only copy of the plaintext; the stored record
/// holds its hash.
#[derive(Debug, Clone)]
pub struct IssuedCode {
    /// Plaintext code for the redirect. Returned exactly once.
    pub code: String,

    /// The stored record.
    pub record: AuthorizationCode,
}

/// Authorization service for handling OAuth 2.0 authorization requests.
pub struct AuthorizationService {
    client_storage: Arc<dyn ClientStorage>,
    code_storage: Arc<dyn AuthorizationCodeStorage>,
    consent_storage: Arc<dyn ConsentStorage>,
    audit_sink: Option<Arc<dyn AuditSink>>,
    config: OAuthConfig,
}

impl AuthorizationService {
    /// Creates a new authorization service.
    #[must_use]
    pub fn new(
        client_storage: Arc<dyn ClientStorage>,
        code_storage: Arc<dyn AuthorizationCodeStorage>,
        consent_storage: Arc<dyn ConsentStorage>,
        config: OAuthConfig,
    ) -> Self {
        Self {
            client_storage,
            code_storage,
            consent_storage,
            audit_sink: None,
            config,
        }
    }

    /// Attaches an audit sink.
    #[must_use]
    pub fn with_audit_sink(mut self, sink: Arc<dyn AuditSink>) -> Self {
        self.audit_sink = Some(sink);
        self
    }

    /// Processes an authorization request for an authenticated user.
    ///
    /// # Errors
    ///
    /// Returns an error if:
    /// - `response_type` is not "code" (`UnsupportedResponseType`)
    /// - Client is not found or inactive (`InvalidClient`)
    /// - Redirect URI is not registered (`InvalidGrant`)
    /// - Grant type is not allowed for the client (`UnauthorizedClient`)
    /// - A requested scope is outside the client's allowed set (`InvalidScope`)
    /// - PKCE is required but missing, or malformed (`InvalidRequest`)
    /// - Consent is required and not on file (`ConsentRequired`)
    ///
    /// # Security
    ///
    /// Never log the authorization code. The redirect URI must exactly
    /// match a registered URI before any error is sent through it.
    pub async fn authorize(
        &self,
        request: &AuthorizationRequest,
        user_id: &str,
    ) -> AuthResult<IssuedCode> {
        // 1. Validate response_type
        if request.response_type != "code" {
            return Err(AuthError::unsupported_response_type(&request.response_type));
        }

        // 2. Validate client exists and is active
        let client = self
            .client_storage
            .find_by_client_id(&request.client_id)
            .await?
            .ok_or_else(|| AuthError::invalid_client("Client authentication failed"))?;

        if !client.is_active {
            return Err(AuthError::invalid_client("Client authentication failed"));
        }

        // 3. Validate redirect_uri against the registration, exact match
        if !client.is_redirect_uri_allowed(&request.redirect_uri) {
            return Err(AuthError::invalid_grant("Invalid redirect_uri"));
        }

        // 4. Validate grant type is allowed
        if !client.is_grant_type_allowed(GrantType::AuthorizationCode) {
            return Err(AuthError::unauthorized_client(
                "Client is not authorized for authorization_code grant",
            ));
        }

        // 5. Resolve and validate scope
        let scope = self.resolve_scope(&client, &request.scope)?;

        // 6. PKCE gate
        let (code_challenge, code_challenge_method) = self.validate_pkce(&client, request)?;

        // 7. Consent gate
        if client.needs_consent() {
            let scopes: Vec<&str> = scope.split_whitespace().collect();
            let consented = self
                .consent_storage
                .find(user_id, &client.client_id)
                .await?
                .is_some_and(|consent| !consent.is_revoked() && consent.covers_scopes(&scopes));

            if !consented {
                return Err(AuthError::consent_required(
                    "User consent required for the requested scopes",
                ));
            }
        }

        // 8. Issue the code, stored by hash
        let code = generate_token();
        let now = OffsetDateTime::now_utc();
        let record = AuthorizationCode {
            id: Uuid::new_v4(),
            code_hash: hash_token(&code),
            client_id: client.client_id.clone(),
            user_id: user_id.to_string(),
            redirect_uri: request.redirect_uri.clone(),
            scope,
            code_challenge,
            code_challenge_method,
            nonce: request.nonce.clone(),
            used: false,
            expires_at: now + Duration::seconds(self.config.authorization_code_lifetime.as_secs() as i64),
            created_at: now,
        };

        self.code_storage.create(&record).await?;

        self.audit(
            AuditEvent::new(AuditEventKind::AuthorizationCodeIssued)
                .with_client(&record.client_id)
                .with_user(user_id)
                .with_scope(&record.scope),
        )
        .await;

        Ok(IssuedCode { code, record })
    }

    /// Resolves the effective scope: explicit request, or the client's
    /// default scopes when the request omits them.
    fn resolve_scope(&self, client: &Client, requested: &str) -> AuthResult<String> {
        let scope = if requested.trim().is_empty() {
            client.default_scopes.join(" ")
        } else {
            requested.to_string()
        };

        let scopes: Vec<&str> = scope.split_whitespace().collect();
        if !client.scopes_allowed(&scopes) {
            return Err(AuthError::invalid_scope(
                "Requested scope exceeds the client's allowed scopes",
            ));
        }

        Ok(scope)
    }

    /// Validates the PKCE parameters against the client's requirements and
    /// returns the challenge to bind to the code.
    fn validate_pkce(
        &self,
        client: &Client,
        request: &AuthorizationRequest,
    ) -> AuthResult<(Option<String>, Option<PkceChallengeMethod>)> {
        let Some(ref challenge) = request.code_challenge else {
            if client.requires_pkce() {
                return Err(AuthError::invalid_request(
                    "code_challenge is required for this client",
                ));
            }
            if request.code_challenge_method.is_some() {
                return Err(AuthError::invalid_request(
                    "code_challenge_method without code_challenge",
                ));
            }
            return Ok((None, None));
        };

        // RFC 7636: a challenge without a method defaults to plain
        let method = match request.code_challenge_method.as_deref() {
            Some(raw) => PkceChallengeMethod::parse(raw)
                .map_err(|e| AuthError::invalid_request(e.to_string()))?,
            None => PkceChallengeMethod::Plain,
        };

        let challenge = PkceChallenge::new(challenge.clone())
            .map_err(|e| AuthError::invalid_request(e.to_string()))?;

        Ok((Some(challenge.into_inner()), Some(method)))
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
    use crate::oauth::pkce::PkceVerifier;
    use crate::types::{ClientType, UserConsent};
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

        fn add_client(&self, client: Client) {
            self.clients
                .write()
                .unwrap()
                .insert(client.client_id.clone(), client);
        }
    }

    #[async_trait::async_trait]
    impl ClientStorage for MockClientStorage {
        async fn create(&self, client: &Client) -> AuthResult<()> {
            self.add_client(client.clone());
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
            self.add_client(client.clone());
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

    struct MockCodeStorage {
        codes: RwLock<HashMap<String, AuthorizationCode>>,
    }

    impl MockCodeStorage {
        fn new() -> Self {
            Self {
                codes: RwLock::new(HashMap::new()),
            }
        }
    }

    #[async_trait::async_trait]
    impl AuthorizationCodeStorage for MockCodeStorage {
        async fn create(&self, code: &AuthorizationCode) -> AuthResult<()> {
            self.codes
                .write()
                .unwrap()
                .insert(code.code_hash.clone(), code.clone());
            Ok(())
        }

        async fn find_by_hash(&self, code_hash: &str) -> AuthResult<Option<AuthorizationCode>> {
            Ok(self.codes.read().unwrap().get(code_hash).cloned())
        }

        async fn consume(&self, code_hash: &str) -> AuthResult<AuthorizationCode> {
            let mut codes = self.codes.write().unwrap();
            let code = codes
                .get_mut(code_hash)
                .ok_or_else(|| AuthError::invalid_grant("Code not found"))?;
            if code.used {
                return Err(AuthError::invalid_grant("Code already used"));
            }
            if code.is_expired() {
                return Err(AuthError::invalid_grant("Code expired"));
            }
            code.used = true;
            Ok(code.clone())
        }

        async fn cleanup_expired(&self) -> AuthResult<u64> {
            let mut codes = self.codes.write().unwrap();
            let before = codes.len();
            codes.retain(|_, c| !c.is_expired());
            Ok((before - codes.len()) as u64)
        }
    }

    struct MockConsentStorage {
        consents: RwLock<HashMap<(String, String), UserConsent>>,
    }

    impl MockConsentStorage {
        fn new() -> Self {
            Self {
                consents: RwLock::new(HashMap::new()),
            }
        }

        fn add(&self, consent: UserConsent) {
            self.consents.write().unwrap().insert(
                (consent.user_id.clone(), consent.client_id.clone()),
                consent,
            );
        }
    }

    #[async_trait::async_trait]
    impl ConsentStorage for MockConsentStorage {
        async fn upsert(&self, consent: &UserConsent) -> AuthResult<()> {
            self.add(consent.clone());
            Ok(())
        }

        async fn find(&self, user_id: &str, client_id: &str) -> AuthResult<Option<UserConsent>> {
            Ok(self
                .consents
                .read()
                .unwrap()
                .get(&(user_id.to_string(), client_id.to_string()))
                .cloned())
        }

        async fn revoke(&self, user_id: &str, client_id: &str) -> AuthResult<()> {
            let mut consents = self.consents.write().unwrap();
            let consent = consents
                .get_mut(&(user_id.to_string(), client_id.to_string()))
                .ok_or_else(|| AuthError::invalid_request("Consent not found"))?;
            consent.revoked_at = Some(OffsetDateTime::now_utc());
            Ok(())
        }

        async fn list_by_user(&self, user_id: &str) -> AuthResult<Vec<UserConsent>> {
            Ok(self
                .consents
                .read()
                .unwrap()
                .values()
                .filter(|c| c.user_id == user_id && !c.is_revoked())
                .cloned()
                .collect())
        }
    }

    fn test_client() -> Client {
        let now = OffsetDateTime::now_utc();
        Client {
            id: Uuid::new_v4(),
            client_id: "agw_test".to_string(),
            client_secret_hash: None,
            name: "Test App".to_string(),
            description: None,
            logo_url: None,
            client_type: ClientType::Public,
            redirect_uris: vec!["https://app.example.com/callback".to_string()],
            allowed_grant_types: vec![GrantType::AuthorizationCode, GrantType::RefreshToken],
            allowed_scopes: vec![
                "openid".to_string(),
                "profile".to_string(),
                "email".to_string(),
            ],
            default_scopes: vec!["openid".to_string()],
            access_token_lifetime: None,
            refresh_token_lifetime: None,
            id_token_lifetime: None,
            require_pkce: true,
            require_consent: false,
            first_party: false,
            owner_id: None,
            is_active: true,
            created_at: now,
            updated_at: now,
        }
    }

    fn test_request() -> AuthorizationRequest {
        let verifier = PkceVerifier::generate();
        let challenge = PkceChallenge::from_verifier(&verifier, PkceChallengeMethod::S256);

        AuthorizationRequest {
            response_type: "code".to_string(),
            client_id: "agw_test".to_string(),
            redirect_uri: "https://app.example.com/callback".to_string(),
            scope: "openid profile".to_string(),
            state: Some("abcdefghijklmnopqrstuvwxyz".to_string()),
            code_challenge: Some(challenge.into_inner()),
            code_challenge_method: Some("S256".to_string()),
            nonce: None,
        }
    }

    fn service() -> (
        AuthorizationService,
        Arc<MockClientStorage>,
        Arc<MockCodeStorage>,
        Arc<MockConsentStorage>,
    ) {
        let clients = Arc::new(MockClientStorage::new());
        let codes = Arc::new(MockCodeStorage::new());
        let consents = Arc::new(MockConsentStorage::new());
        let service = AuthorizationService::new(
            clients.clone(),
            codes.clone(),
            consents.clone(),
            OAuthConfig::default(),
        );
        (service, clients, codes, consents)
    }

    #[tokio::test]
    async fn test_authorize_success() {
        let (service, clients, codes, _) = service();
        clients.add_client(test_client());

        let issued = service.authorize(&test_request(), "user-1").await.unwrap();

        assert_eq!(issued.code.len(), 43); // base64url of 32 bytes
        assert_eq!(issued.record.client_id, "agw_test");
        assert_eq!(issued.record.user_id, "user-1");
        assert_eq!(issued.record.scope, "openid profile");
        assert!(!issued.record.used);
        assert!(issued.record.is_valid());

        // Stored under the hash of the plaintext, never the plaintext
        let stored = codes
            .find_by_hash(&hash_token(&issued.code))
            .await
            .unwrap();
        assert!(stored.is_some());
    }

    #[tokio::test]
    async fn test_authorize_invalid_response_type() {
        let (service, clients, _, _) = service();
        clients.add_client(test_client());

        let mut request = test_request();
        request.response_type = "token".to_string();

        let result = service.authorize(&request, "user-1").await;
        assert!(matches!(
            result,
            Err(AuthError::UnsupportedResponseType { .. })
        ));
    }

    #[tokio::test]
    async fn test_authorize_unknown_client() {
        let (service, _, _, _) = service();

        let result = service.authorize(&test_request(), "user-1").await;
        assert!(matches!(result, Err(AuthError::InvalidClient { .. })));
    }

    #[tokio::test]
    async fn test_authorize_inactive_client() {
        let (service, clients, _, _) = service();
        let mut client = test_client();
        client.is_active = false;
        clients.add_client(client);

        let result = service.authorize(&test_request(), "user-1").await;
        assert!(matches!(result, Err(AuthError::InvalidClient { .. })));
    }

    #[tokio::test]
    async fn test_authorize_unregistered_redirect_uri() {
        let (service, clients, _, _) = service();
        clients.add_client(test_client());

        let mut request = test_request();
        request.redirect_uri = "https://evil.example.com/callback".to_string();

        let result = service.authorize(&request, "user-1").await;
        assert!(matches!(result, Err(AuthError::InvalidGrant { .. })));
    }

    #[tokio::test]
    async fn test_authorize_grant_type_not_allowed() {
        let (service, clients, _, _) = service();
        let mut client = test_client();
        client.allowed_grant_types = vec![GrantType::ClientCredentials];
        clients.add_client(client);

        let result = service.authorize(&test_request(), "user-1").await;
        assert!(matches!(result, Err(AuthError::UnauthorizedClient { .. })));
    }

    #[tokio::test]
    async fn test_authorize_scope_exceeds_allowed() {
        let (service, clients, _, _) = service();
        clients.add_client(test_client());

        let mut request = test_request();
        request.scope = "openid admin:write".to_string();

        let result = service.authorize(&request, "user-1").await;
        assert!(matches!(result, Err(AuthError::InvalidScope { .. })));
    }

    #[tokio::test]
    async fn test_authorize_empty_scope_falls_back_to_defaults() {
        let (service, clients, _, _) = service();
        clients.add_client(test_client());

        let mut request = test_request();
        request.scope = String::new();

        let issued = service.authorize(&request, "user-1").await.unwrap();
        assert_eq!(issued.record.scope, "openid");
    }

    #[tokio::test]
    async fn test_authorize_public_client_requires_pkce() {
        let (service, clients, _, _) = service();
        clients.add_client(test_client());

        let mut request = test_request();
        request.code_challenge = None;
        request.code_challenge_method = None;

        let result = service.authorize(&request, "user-1").await;
        assert!(matches!(result, Err(AuthError::InvalidRequest { .. })));
    }

    #[tokio::test]
    async fn test_authorize_confidential_client_without_pkce() {
        let (service, clients, _, _) = service();
        let mut client = test_client();
        client.client_type = ClientType::Confidential;
        client.client_secret_hash = Some("hash".to_string());
        client.require_pkce = false;
        clients.add_client(client);

        let mut request = test_request();
        request.code_challenge = None;
        request.code_challenge_method = None;

        let issued = service.authorize(&request, "user-1").await.unwrap();
        assert!(issued.record.code_challenge.is_none());
    }

    #[tokio::test]
    async fn test_authorize_challenge_without_method_defaults_to_plain() {
        let (service, clients, _, _) = service();
        clients.add_client(test_client());

        let verifier = PkceVerifier::generate();
        let mut request = test_request();
        request.code_challenge = Some(verifier.as_str().to_string());
        request.code_challenge_method = None;

        let issued = service.authorize(&request, "user-1").await.unwrap();
        assert_eq!(
            issued.record.code_challenge_method,
            Some(PkceChallengeMethod::Plain)
        );
    }

    #[tokio::test]
    async fn test_authorize_invalid_challenge_method() {
        let (service, clients, _, _) = service();
        clients.add_client(test_client());

        let mut request = test_request();
        request.code_challenge_method = Some("S512".to_string());

        let result = service.authorize(&request, "user-1").await;
        assert!(matches!(result, Err(AuthError::InvalidRequest { .. })));
    }

    #[tokio::test]
    async fn test_authorize_consent_required_without_consent() {
        let (service, clients, _, _) = service();
        let mut client = test_client();
        client.require_consent = true;
        clients.add_client(client);

        let result = service.authorize(&test_request(), "user-1").await;
        assert!(matches!(result, Err(AuthError::ConsentRequired { .. })));
    }

    #[tokio::test]
    async fn test_authorize_consent_on_file() {
        let (service, clients, _, consents) = service();
        let mut client = test_client();
        client.require_consent = true;
        clients.add_client(client);

        consents.add(UserConsent {
            id: Uuid::new_v4(),
            user_id: "user-1".to_string(),
            client_id: "agw_test".to_string(),
            scopes: vec!["openid".to_string(), "profile".to_string()],
            granted_at: OffsetDateTime::now_utc(),
            revoked_at: None,
        });

        let result = service.authorize(&test_request(), "user-1").await;
        assert!(result.is_ok());
    }

    #[tokio::test]
    async fn test_authorize_revoked_consent_does_not_count() {
        let (service, clients, _, consents) = service();
        let mut client = test_client();
        client.require_consent = true;
        clients.add_client(client);

        consents.add(UserConsent {
            id: Uuid::new_v4(),
            user_id: "user-1".to_string(),
            client_id: "agw_test".to_string(),
            scopes: vec!["openid".to_string(), "profile".to_string()],
            granted_at: OffsetDateTime::now_utc(),
            revoked_at: Some(OffsetDateTime::now_utc()),
        });

        let result = service.authorize(&test_request(), "user-1").await;
        assert!(matches!(result, Err(AuthError::ConsentRequired { .. })));
    }

    #[tokio::test]
    async fn test_authorize_consent_scope_subset_check() {
        let (service, clients, _, consents) = service();
        let mut client = test_client();
        client.require_consent = true;
        clients.add_client(client);

        // Consent covers only openid, request asks for openid profile
        consents.add(UserConsent {
            id: Uuid::new_v4(),
            user_id: "user-1".to_string(),
            client_id: "agw_test".to_string(),
            scopes: vec!["openid".to_string()],
            granted_at: OffsetDateTime::now_utc(),
            revoked_at: None,
        });

        let result = service.authorize(&test_request(), "user-1").await;
        assert!(matches!(result, Err(AuthError::ConsentRequired { .. })));
    }

    #[tokio::test]
    async fn test_authorize_first_party_skips_consent() {
        let (service, clients, _, _) = service();
        let mut client = test_client();
        client.require_consent = true;
        client.first_party = true;
        clients.add_client(client);

        let result = service.authorize(&test_request(), "user-1").await;
        assert!(result.is_ok());
    }
}
