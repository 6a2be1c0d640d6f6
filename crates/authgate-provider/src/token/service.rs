//! Token endpoint service.
//!
//! Handles every grant the token endpoint accepts:
//!
//! - `authorization_code` exchange (with PKCE verification)
//! - `client_credentials` for machine-to-machine clients
//! - `refresh_token` rotation
//! - device code polling (RFC 8628)
//!
//! plus introspection (RFC 7662), revocation (RFC 7009), and the userinfo
//! projection.
//!
//! # Usage
//!
//! ```ignore
//! use authgate_provider::token::TokenService;
//!
//! let service = TokenService::new(
//!     clients, codes, access_tokens, refresh_tokens, device_codes, users,
//!     "https://auth.example.com", config,
//! )
//! .with_jwt_service(jwt_service);
//!
//! let response = service.handle_token_request(&request).await?;
//! ```
//!
//! # Security
//!
//! - Authorization codes and refresh tokens are consumed atomically in the
//!   storage layer; this service never re-checks what the store already
//!   guarantees
//! - A replayed authorization code is logged and audited before the uniform
//!   `invalid_grant` goes back to the caller
//! - Token plaintext is never logged

use std::collections::HashSet;
use std::sync::Arc;

use time::{Duration, OffsetDateTime};
use uuid::Uuid;

use crate::AuthResult;
use crate::audit::{AuditEvent, AuditEventKind, AuditSink};
use crate::client::ClientService;
use crate::config::OAuthConfig;
use crate::error::AuthError;
use crate::oauth::pkce::{PkceChallenge, PkceChallengeMethod, PkceVerifier};
use crate::oauth::token::{TokenRequest, TokenResponse};
use crate::oidc::UserInfoResponse;
use crate::storage::{
    AccessTokenStorage, AuthorizationCodeStorage, DeviceCodeStorage, RefreshTokenStorage,
    SessionBinding, SessionBridge, UserStorage,
};
use crate::token::introspection::{IntrospectionRequest, IntrospectionResponse};
use crate::token::jwt::{AccessTokenClaims, IdTokenClaims, JwtService};
use crate::token::revocation::{RevocationRequest, TokenTypeHint};
use crate::types::{
    AccessTokenRecord, AuthorizationCode, Client, DeviceCodeStatus, GrantType, RefreshTokenRecord,
    generate_token, hash_token,
};

/// Service behind the token endpoint.
///
/// Without a JWT service the provider runs in opaque-token mode: access
/// tokens are random strings validated against the store, and operations
/// that need a signature (ID tokens) fail with `SignerUnavailable`.
pub struct TokenService {
    clients: Arc<ClientService>,
    code_storage: Arc<dyn AuthorizationCodeStorage>,
    access_token_storage: Arc<dyn AccessTokenStorage>,
    refresh_token_storage: Arc<dyn RefreshTokenStorage>,
    device_code_storage: Arc<dyn DeviceCodeStorage>,
    user_storage: Arc<dyn UserStorage>,
    jwt_service: Option<Arc<JwtService>>,
    session_bridge: Option<Arc<dyn SessionBridge>>,
    audit_sink: Option<Arc<dyn AuditSink>>,
    issuer: String,
    config: OAuthConfig,
}

impl TokenService {
    /// Creates a new token service in opaque-token mode.
    #[must_use]
    #[allow(clippy::too_many_arguments)]
    pub fn new(
        clients: Arc<ClientService>,
        code_storage: Arc<dyn AuthorizationCodeStorage>,
        access_token_storage: Arc<dyn AccessTokenStorage>,
        refresh_token_storage: Arc<dyn RefreshTokenStorage>,
        device_code_storage: Arc<dyn DeviceCodeStorage>,
        user_storage: Arc<dyn UserStorage>,
        issuer: impl Into<String>,
        config: OAuthConfig,
    ) -> Self {
        Self {
            clients,
            code_storage,
            access_token_storage,
            refresh_token_storage,
            device_code_storage,
            user_storage,
            jwt_service: None,
            session_bridge: None,
            audit_sink: None,
            issuer: issuer.into(),
            config,
        }
    }

    /// Attaches a JWT service; access and ID tokens become signed JWTs.
    #[must_use]
    pub fn with_jwt_service(mut self, jwt_service: Arc<JwtService>) -> Self {
        self.jwt_service = Some(jwt_service);
        self
    }

    /// Attaches a session bridge for best-effort session lifecycle hooks.
    #[must_use]
    pub fn with_session_bridge(mut self, bridge: Arc<dyn SessionBridge>) -> Self {
        self.session_bridge = Some(bridge);
        self
    }

    /// Attaches an audit sink.
    #[must_use]
    pub fn with_audit_sink(mut self, sink: Arc<dyn AuditSink>) -> Self {
        self.audit_sink = Some(sink);
        self
    }

    /// Returns the JWT service, when one is configured.
    #[must_use]
    pub fn jwt_service(&self) -> Option<&Arc<JwtService>> {
        self.jwt_service.as_ref()
    }

    /// Returns the issuer URL.
    #[must_use]
    pub fn issuer(&self) -> &str {
        &self.issuer
    }

    // ========================================================================
    // Grant dispatch
    // ========================================================================

    /// Handles a token request end to end: authenticates the client and
    /// dispatches on `grant_type`.
    ///
    /// # Errors
    ///
    /// Returns `UnsupportedGrantType` for unknown grants, `InvalidClient`
    /// when client authentication fails, `UnauthorizedClient` when the
    /// client is not allowed the grant, or the grant handler's error.
    pub async fn handle_token_request(&self, request: &TokenRequest) -> AuthResult<TokenResponse> {
        let grant_type = GrantType::parse(&request.grant_type)
            .ok_or_else(|| AuthError::unsupported_grant_type(&request.grant_type))?;

        let client_id = request
            .client_id
            .as_deref()
            .ok_or_else(|| AuthError::invalid_client("Client authentication failed"))?;

        let client = self
            .clients
            .verify_credentials(client_id, request.client_secret.as_deref())
            .await?;

        if !client.is_grant_type_allowed(grant_type) {
            return Err(AuthError::unauthorized_client(format!(
                "Client is not allowed the {grant_type} grant"
            )));
        }

        match grant_type {
            GrantType::AuthorizationCode => self.exchange_code(request, &client).await,
            GrantType::ClientCredentials => self.client_credentials(request, &client).await,
            GrantType::RefreshToken => self.refresh(request, &client).await,
            GrantType::DeviceCode => self.poll_device_token(request, &client).await,
        }
    }

    // ========================================================================
    // authorization_code
    // ========================================================================

    /// Exchanges an authorization code for tokens.
    ///
    /// The code is consumed atomically before any token is minted, so a
    /// replayed code can never race a concurrent exchange into two token
    /// sets.
    ///
    /// # Errors
    ///
    /// Returns `InvalidGrant` for a missing, unknown, used, or expired code,
    /// a client or redirect URI mismatch, and `PkceVerificationFailed` when
    /// the verifier does not match the recorded challenge.
    pub async fn exchange_code(
        &self,
        request: &TokenRequest,
        client: &Client,
    ) -> AuthResult<TokenResponse> {
        let code = request
            .code
            .as_ref()
            .ok_or_else(|| AuthError::invalid_grant("Missing code parameter"))?;
        let redirect_uri = request
            .redirect_uri
            .as_ref()
            .ok_or_else(|| AuthError::invalid_grant("Missing redirect_uri parameter"))?;

        let code_hash = hash_token(code);
        let record = match self.code_storage.consume(&code_hash).await {
            Ok(record) => record,
            Err(err) => {
                self.flag_code_replay(&code_hash).await;
                return Err(match err {
                    AuthError::InvalidGrant { .. } => err,
                    _ => AuthError::invalid_grant("Invalid authorization code"),
                });
            }
        };

        if record.is_expired() {
            return Err(AuthError::invalid_grant("Authorization code expired"));
        }
        if record.client_id != client.client_id {
            return Err(AuthError::invalid_grant(
                "Authorization code was issued to a different client",
            ));
        }
        if record.redirect_uri != *redirect_uri {
            return Err(AuthError::invalid_grant(
                "Redirect URI does not match authorization request",
            ));
        }

        if let Err(err) = self.verify_pkce(&record, request.code_verifier.as_deref()) {
            if matches!(err, AuthError::PkceVerificationFailed) {
                tracing::warn!(
                    client_id = %client.client_id,
                    "PKCE verification failed at code exchange"
                );
                self.audit(
                    AuditEvent::new(AuditEventKind::PkceVerificationFailed)
                        .with_client(client.client_id.as_str())
                        .with_user(record.user_id.as_str()),
                )
                .await;
            }
            return Err(err);
        }

        let response = self
            .issue_user_tokens(client, &record.user_id, &record.scope, record.nonce.as_deref())
            .await?;

        self.audit(
            AuditEvent::new(AuditEventKind::TokensIssued)
                .with_client(client.client_id.as_str())
                .with_user(record.user_id.as_str())
                .with_scope(record.scope.as_str()),
        )
        .await;

        Ok(response)
    }

    /// Logs and audits an exchange attempt against an already-used code.
    async fn flag_code_replay(&self, code_hash: &str) {
        if let Ok(Some(record)) = self.code_storage.find_by_hash(code_hash).await {
            if record.used {
                tracing::warn!(
                    client_id = %record.client_id,
                    "authorization code replay detected"
                );
                self.audit(
                    AuditEvent::new(AuditEventKind::AuthorizationCodeReplayed)
                        .with_client(record.client_id.as_str())
                        .with_user(record.user_id.as_str()),
                )
                .await;
            }
        }
    }

    /// Logs and audits presentation of a revoked or consumed refresh token.
    async fn flag_refresh_replay(&self, token_hash: &str) {
        if let Ok(Some(record)) = self.refresh_token_storage.find_by_hash(token_hash).await {
            if record.is_revoked() {
                tracing::warn!(
                    client_id = %record.client_id,
                    "revoked refresh token presented"
                );
                let mut event = AuditEvent::new(AuditEventKind::RefreshTokenReplayed)
                    .with_client(record.client_id.as_str());
                if let Some(user_id) = record.user_id.as_deref() {
                    event = event.with_user(user_id);
                }
                self.audit(event).await;
            }
        }
    }

    /// Verifies the PKCE verifier against the challenge recorded with the
    /// code. A code issued without a challenge passes without a verifier.
    fn verify_pkce(&self, record: &AuthorizationCode, verifier: Option<&str>) -> AuthResult<()> {
        let Some(challenge) = record.code_challenge.as_deref() else {
            return Ok(());
        };

        let verifier = verifier
            .ok_or_else(|| AuthError::invalid_request("code_verifier is required"))?;
        let method = record
            .code_challenge_method
            .unwrap_or(PkceChallengeMethod::Plain);

        let challenge = PkceChallenge::new(challenge.to_string())
            .map_err(|e| AuthError::invalid_grant(format!("Invalid PKCE challenge: {e}")))?;
        let verifier = PkceVerifier::new(verifier.to_string())
            .map_err(|e| AuthError::invalid_grant(format!("Invalid PKCE verifier: {e}")))?;

        challenge
            .verify(&verifier, method)
            .map_err(|_| AuthError::PkceVerificationFailed)
    }

    // ========================================================================
    // client_credentials
    // ========================================================================

    /// Handles the client_credentials grant.
    ///
    /// No user is involved: the subject is the client itself, and neither a
    /// refresh token nor an ID token is issued.
    ///
    /// # Errors
    ///
    /// Returns `UnauthorizedClient` for public clients and `InvalidScope`
    /// when the requested scope exceeds the client's allowed set.
    pub async fn client_credentials(
        &self,
        request: &TokenRequest,
        client: &Client,
    ) -> AuthResult<TokenResponse> {
        if !client.is_confidential() {
            return Err(AuthError::unauthorized_client(
                "client_credentials is restricted to confidential clients",
            ));
        }

        let scope = self.resolve_scope(request.scope.as_deref(), client)?;

        let (access_token, _, lifetime) = self
            .mint_access_token(client, None, Vec::new(), &scope)
            .await?;

        self.audit(
            AuditEvent::new(AuditEventKind::TokensIssued)
                .with_client(client.client_id.as_str())
                .with_scope(scope.as_str()),
        )
        .await;

        Ok(TokenResponse::new(access_token, lifetime as u64, scope))
    }

    /// Resolves the requested scope: an absent or empty `scope` parameter
    /// falls back to the client's default scopes, and the result must be a
    /// subset of the allowed set.
    fn resolve_scope(&self, requested: Option<&str>, client: &Client) -> AuthResult<String> {
        let scope = match requested {
            Some(s) if !s.trim().is_empty() => s.trim().to_string(),
            _ => client.default_scopes.join(" "),
        };

        let scopes: Vec<&str> = scope.split_whitespace().collect();
        if !client.scopes_allowed(&scopes) {
            return Err(AuthError::invalid_scope(
                "Requested scope exceeds the client's allowed scopes",
            ));
        }

        Ok(scope)
    }

    // ========================================================================
    // refresh_token
    // ========================================================================

    /// Exchanges a refresh token for a new access token.
    ///
    /// With rotation enabled (the default) the presented token is revoked
    /// atomically before its successor is minted; the successor keeps the
    /// original expiry so a lineage cannot outlive its first grant. The ID
    /// token is never reissued on refresh.
    ///
    /// # Errors
    ///
    /// Returns `InvalidGrant` for a missing, unknown, revoked, or expired
    /// token or a client mismatch, and `InvalidScope` when the request asks
    /// for more scope than originally granted.
    pub async fn refresh(
        &self,
        request: &TokenRequest,
        client: &Client,
    ) -> AuthResult<TokenResponse> {
        let token_value = request
            .refresh_token
            .as_ref()
            .ok_or_else(|| AuthError::invalid_grant("Missing refresh_token parameter"))?;
        let token_hash = hash_token(token_value);

        let stored = if self.config.refresh_token_rotation {
            match self.refresh_token_storage.consume(&token_hash).await {
                Ok(stored) => stored,
                Err(err) => {
                    self.flag_refresh_replay(&token_hash).await;
                    return Err(err);
                }
            }
        } else {
            let token = self
                .refresh_token_storage
                .find_by_hash(&token_hash)
                .await?
                .ok_or_else(|| AuthError::invalid_grant("Invalid refresh token"))?;
            if !token.is_valid() {
                self.flag_refresh_replay(&token_hash).await;
                return Err(AuthError::invalid_grant("Refresh token is no longer valid"));
            }
            token
        };

        if stored.client_id != client.client_id {
            return Err(AuthError::invalid_grant(
                "Refresh token was issued to a different client",
            ));
        }

        let scope = self.narrow_scope(request.scope.as_deref(), &stored.scope)?;

        let roles = match stored.user_id.as_deref() {
            Some(user_id) => self
                .user_storage
                .find_by_id(user_id)
                .await?
                .map(|u| u.roles)
                .unwrap_or_default(),
            None => Vec::new(),
        };

        let (access_token, access_id, lifetime) = self
            .mint_access_token(client, stored.user_id.as_deref(), roles, &scope)
            .await?;
        let mut response = TokenResponse::new(access_token, lifetime as u64, scope.clone());

        if self.config.refresh_token_rotation {
            let successor = self
                .mint_refresh_token(
                    client,
                    stored.user_id.as_deref(),
                    &scope,
                    access_id,
                    stored.expires_at,
                )
                .await?;
            response = response.with_refresh_token(successor);
        }

        // The session follows the token lineage: rebind it from the
        // consumed hash to the successors
        if let (Some(bridge), Some(user_id)) = (&self.session_bridge, stored.user_id.as_deref()) {
            let binding = SessionBinding {
                user_id: user_id.to_string(),
                access_token_hash: hash_token(&response.access_token),
                refresh_token_hash: Some(match response.refresh_token.as_deref() {
                    Some(successor) => hash_token(successor),
                    None => token_hash.clone(),
                }),
                expires_at: stored.expires_at,
            };
            if let Err(err) = bridge.refresh_session(&token_hash, &binding).await {
                tracing::warn!(error = %err, "session rebind after token refresh failed");
            }
        }

        let mut event = AuditEvent::new(AuditEventKind::TokenRefreshed)
            .with_client(client.client_id.as_str())
            .with_scope(scope.as_str());
        if let Some(user_id) = stored.user_id.as_deref() {
            event = event.with_user(user_id);
        }
        self.audit(event).await;

        Ok(response)
    }

    /// A refreshed scope may be narrowed, never expanded.
    fn narrow_scope(&self, requested: Option<&str>, original: &str) -> AuthResult<String> {
        match requested {
            None => Ok(original.to_string()),
            Some(requested) => {
                let original_scopes: HashSet<&str> = original.split_whitespace().collect();
                let requested_scopes: HashSet<&str> = requested.split_whitespace().collect();

                if !requested_scopes.is_subset(&original_scopes) {
                    return Err(AuthError::invalid_scope(
                        "Requested scope exceeds original grant",
                    ));
                }

                Ok(requested.to_string())
            }
        }
    }

    // ========================================================================
    // Device code polling
    // ========================================================================

    /// Handles a device flow poll at the token endpoint.
    ///
    /// Polling faster than the advertised interval is answered with
    /// `slow_down` (when enforcement is on); each poll stamps
    /// `last_polled_at` whether or not it was early.
    ///
    /// # Errors
    ///
    /// Returns `AuthorizationPending` while the user has not decided,
    /// `AccessDenied` after a denial, `ExpiredToken` past the expiry, and
    /// `InvalidGrant` for an unknown device code or a client mismatch.
    pub async fn poll_device_token(
        &self,
        request: &TokenRequest,
        client: &Client,
    ) -> AuthResult<TokenResponse> {
        let device_code = request
            .device_code
            .as_ref()
            .ok_or_else(|| AuthError::invalid_grant("Missing device_code parameter"))?;
        let device_code_hash = hash_token(device_code);

        let record = self
            .device_code_storage
            .find_by_device_code_hash(&device_code_hash)
            .await?
            .ok_or_else(|| AuthError::invalid_grant("Invalid device code"))?;

        if record.client_id != client.client_id {
            return Err(AuthError::invalid_grant(
                "Device code was issued to a different client",
            ));
        }

        // Expiry wins over pacing: an expired code must not answer
        // slow_down, or a fast-polling device would never stop
        if record.is_expired() {
            return Err(AuthError::ExpiredToken);
        }

        let now = OffsetDateTime::now_utc();
        if self.config.enforce_poll_interval {
            if let Some(last) = record.last_polled_at {
                if (now - last).whole_seconds() < record.interval as i64 {
                    self.device_code_storage
                        .mark_polled(&device_code_hash, now)
                        .await?;
                    return Err(AuthError::SlowDown);
                }
            }
        }
        self.device_code_storage
            .mark_polled(&device_code_hash, now)
            .await?;

        match record.status {
            DeviceCodeStatus::Pending => Err(AuthError::AuthorizationPending),
            DeviceCodeStatus::Denied => Err(AuthError::access_denied(
                "The user denied the authorization request",
            )),
            DeviceCodeStatus::Authorized => {
                let user_id = record.user_id.as_deref().ok_or_else(|| {
                    AuthError::internal("Authorized device code has no user attached")
                })?;

                let response = self
                    .issue_user_tokens(client, user_id, &record.scope, None)
                    .await?;

                self.audit(
                    AuditEvent::new(AuditEventKind::TokensIssued)
                        .with_client(client.client_id.as_str())
                        .with_user(user_id)
                        .with_scope(record.scope.as_str()),
                )
                .await;

                Ok(response)
            }
        }
    }

    // ========================================================================
    // Introspection (RFC 7662)
    // ========================================================================

    /// Introspects a token presented by an authenticated caller.
    ///
    /// Expired, revoked, and unknown tokens are indistinguishable in the
    /// response. The hint only changes lookup order; a wrong hint still
    /// finds the token.
    ///
    /// # Errors
    ///
    /// Returns an error only when storage fails; an unrecognized token is
    /// `Ok` with `active: false`.
    pub async fn introspect(
        &self,
        request: &IntrospectionRequest,
    ) -> AuthResult<IntrospectionResponse> {
        let token_hash = hash_token(&request.token);
        let refresh_first = matches!(request.token_type_hint, Some(TokenTypeHint::RefreshToken));

        if refresh_first {
            if let Some(response) = self.introspect_refresh(&token_hash).await? {
                return Ok(response);
            }
            if let Some(response) = self.introspect_access(&token_hash).await? {
                return Ok(response);
            }
        } else {
            if let Some(response) = self.introspect_access(&token_hash).await? {
                return Ok(response);
            }
            if let Some(response) = self.introspect_refresh(&token_hash).await? {
                return Ok(response);
            }
        }

        Ok(IntrospectionResponse::inactive())
    }

    async fn introspect_access(
        &self,
        token_hash: &str,
    ) -> AuthResult<Option<IntrospectionResponse>> {
        let Some(record) = self.access_token_storage.find_by_hash(token_hash).await? else {
            return Ok(None);
        };
        if !record.is_valid() {
            return Ok(Some(IntrospectionResponse::inactive()));
        }

        let subject = record
            .user_id
            .clone()
            .unwrap_or_else(|| record.client_id.clone());
        let mut response = IntrospectionResponse::active()
            .with_scope(record.scope.as_str())
            .with_client_id(record.client_id.as_str())
            .with_token_type("Bearer")
            .with_sub(subject)
            .with_exp(record.expires_at.unix_timestamp())
            .with_iat(record.created_at.unix_timestamp())
            .with_iss(self.issuer.as_str())
            .with_jti(record.id.to_string());

        // Username enrichment is best-effort
        if let Some(user_id) = record.user_id.as_deref() {
            if let Ok(Some(user)) = self.user_storage.find_by_id(user_id).await {
                response = response.with_username(user.username.as_str());
            }
        }

        Ok(Some(response))
    }

    async fn introspect_refresh(
        &self,
        token_hash: &str,
    ) -> AuthResult<Option<IntrospectionResponse>> {
        let Some(record) = self.refresh_token_storage.find_by_hash(token_hash).await? else {
            return Ok(None);
        };
        if !record.is_valid() {
            return Ok(Some(IntrospectionResponse::inactive()));
        }

        let subject = record
            .user_id
            .clone()
            .unwrap_or_else(|| record.client_id.clone());
        Ok(Some(
            IntrospectionResponse::active()
                .with_scope(record.scope.as_str())
                .with_client_id(record.client_id.as_str())
                .with_token_type("refresh_token")
                .with_sub(subject)
                .with_exp(record.expires_at.unix_timestamp())
                .with_iat(record.created_at.unix_timestamp())
                .with_iss(self.issuer.as_str())
                .with_jti(record.id.to_string()),
        ))
    }

    // ========================================================================
    // Revocation (RFC 7009)
    // ========================================================================

    /// Revokes a token.
    ///
    /// Always succeeds for unknown or already-revoked tokens so callers
    /// cannot probe for token existence. Revoking a refresh token also
    /// revokes its paired access token, and the session bound to the
    /// presented token is torn down best-effort.
    ///
    /// # Errors
    ///
    /// Returns an error only when storage fails.
    pub async fn revoke(&self, request: &RevocationRequest) -> AuthResult<()> {
        let token_hash = hash_token(&request.token);
        let refresh_first = matches!(request.token_type_hint, Some(TokenTypeHint::RefreshToken));

        let revoked = if refresh_first {
            match self.revoke_refresh(&token_hash).await? {
                Some(owner) => Some(owner),
                None => self.revoke_access(&token_hash).await?,
            }
        } else {
            match self.revoke_access(&token_hash).await? {
                Some(owner) => Some(owner),
                None => self.revoke_refresh(&token_hash).await?,
            }
        };

        let Some((client_id, user_id)) = revoked else {
            return Ok(());
        };

        // Only the session bound to this token goes; the user's other
        // devices stay signed in
        if let Some(bridge) = &self.session_bridge {
            match bridge.revoke_session_by_token_hash(&token_hash).await {
                Ok(count) => {
                    tracing::debug!(count, "terminated sessions bound to revoked token");
                }
                Err(err) => {
                    tracing::warn!(error = %err, "session teardown after revocation failed");
                }
            }
        }

        let mut event = AuditEvent::new(AuditEventKind::TokenRevoked).with_client(client_id);
        if let Some(user) = user_id {
            event = event.with_user(user);
        }
        self.audit(event).await;

        Ok(())
    }

    async fn revoke_access(
        &self,
        token_hash: &str,
    ) -> AuthResult<Option<(String, Option<String>)>> {
        let Some(record) = self.access_token_storage.find_by_hash(token_hash).await? else {
            return Ok(None);
        };
        self.access_token_storage.revoke(token_hash).await?;
        Ok(Some((record.client_id, record.user_id)))
    }

    async fn revoke_refresh(
        &self,
        token_hash: &str,
    ) -> AuthResult<Option<(String, Option<String>)>> {
        let Some(record) = self.refresh_token_storage.find_by_hash(token_hash).await? else {
            return Ok(None);
        };
        self.refresh_token_storage.revoke(token_hash).await?;

        // Revoking a refresh token takes its paired access token with it
        if let Some(access_id) = record.access_token_id {
            if let Ok(Some(access)) = self.access_token_storage.find_by_id(access_id).await {
                if let Err(err) = self.access_token_storage.revoke(&access.token_hash).await {
                    tracing::warn!(
                        error = %err,
                        "failed to revoke access token paired with refresh token"
                    );
                }
            }
        }

        Ok(Some((record.client_id, record.user_id)))
    }

    // ========================================================================
    // Userinfo
    // ========================================================================

    /// Resolves userinfo claims for a presented access token.
    ///
    /// Claims are projected by the token's scopes: `profile` contributes
    /// name, username, picture, and update time; `email` contributes the
    /// email address and its verification flag. `sub` is always present.
    ///
    /// # Errors
    ///
    /// Returns `InvalidGrant` for an invalid token, a token with no user
    /// subject, or an unresolvable user.
    pub async fn userinfo(&self, access_token: &str) -> AuthResult<UserInfoResponse> {
        let token_hash = hash_token(access_token);
        let record = self
            .access_token_storage
            .find_by_hash(&token_hash)
            .await?
            .filter(AccessTokenRecord::is_valid)
            .ok_or_else(|| AuthError::invalid_grant("Invalid access token"))?;

        let user_id = record
            .user_id
            .as_deref()
            .ok_or_else(|| AuthError::invalid_grant("Token has no user subject"))?;
        let user = self
            .user_storage
            .find_by_id(user_id)
            .await?
            .ok_or_else(|| AuthError::invalid_grant("Unknown subject"))?;

        let scopes: HashSet<&str> = record.scope.split_whitespace().collect();
        let mut response = UserInfoResponse::new(user.id.clone());

        if scopes.contains("profile") {
            response.name = user.name.clone();
            response.preferred_username = Some(user.username.clone());
            response.picture = user.picture.clone();
            response.updated_at = user.updated_at;
        }
        if scopes.contains("email") {
            response.email = user.email.clone();
            response.email_verified = Some(user.email_verified);
        }
        if scopes.contains("phone") {
            response.phone_number = user.phone_number.clone();
            response.phone_number_verified = Some(user.phone_number_verified);
        }

        Ok(response)
    }

    // ========================================================================
    // Minting helpers
    // ========================================================================

    /// Mints tokens for a user-bound grant: the access token, a refresh
    /// token when the client is allowed the refresh grant, and an ID token
    /// when `openid` was granted.
    async fn issue_user_tokens(
        &self,
        client: &Client,
        user_id: &str,
        scope: &str,
        nonce: Option<&str>,
    ) -> AuthResult<TokenResponse> {
        let user = self.user_storage.find_by_id(user_id).await?;
        let roles = user.as_ref().map(|u| u.roles.clone()).unwrap_or_default();

        let (access_token, access_id, lifetime) = self
            .mint_access_token(client, Some(user_id), roles, scope)
            .await?;
        let mut response = TokenResponse::new(access_token, lifetime as u64, scope.to_string());
        let mut session_expires_at = OffsetDateTime::now_utc() + Duration::seconds(lifetime);

        if client.is_grant_type_allowed(GrantType::RefreshToken) {
            let refresh_lifetime = client.refresh_token_lifetime_secs().max(0);
            let expires_at = OffsetDateTime::now_utc() + Duration::seconds(refresh_lifetime);
            let refresh_token = self
                .mint_refresh_token(client, Some(user_id), scope, access_id, expires_at)
                .await?;
            response = response.with_refresh_token(refresh_token);
            session_expires_at = expires_at;
        }

        if scope.split_whitespace().any(|s| s == "openid") {
            match user.as_ref() {
                Some(user) => {
                    response = response.with_id_token(self.mint_id_token(client, user, nonce)?);
                }
                None => {
                    tracing::warn!(user_id, "openid granted but user is not resolvable");
                }
            }
        }

        // Every user-bound issuance opens a session keyed by the new hashes
        if let Some(bridge) = &self.session_bridge {
            let binding = SessionBinding {
                user_id: user_id.to_string(),
                access_token_hash: hash_token(&response.access_token),
                refresh_token_hash: response.refresh_token.as_deref().map(hash_token),
                expires_at: session_expires_at,
            };
            if let Err(err) = bridge.create_session(&binding).await {
                tracing::warn!(error = %err, "session creation after token issuance failed");
            }
        }

        Ok(response)
    }

    /// Mints and stores an access token. Returns the plaintext, the record
    /// ID (also the `jti` in JWT mode), and the lifetime in seconds.
    async fn mint_access_token(
        &self,
        client: &Client,
        user_id: Option<&str>,
        roles: Vec<String>,
        scope: &str,
    ) -> AuthResult<(String, Uuid, i64)> {
        let now = OffsetDateTime::now_utc();
        let lifetime = client.access_token_lifetime.unwrap_or_else(|| {
            self.config.access_token_lifetime.as_secs() as i64
        });
        let record_id = Uuid::new_v4();
        let subject = user_id.unwrap_or(&client.client_id);

        let access_token = match &self.jwt_service {
            Some(jwt) => {
                let claims =
                    AccessTokenClaims::builder(self.issuer.as_str(), subject, client.client_id.as_str())
                        .audience(vec![client.client_id.clone()])
                        .expires_in_seconds(lifetime)
                        .jti(record_id.to_string())
                        .scope(scope)
                        .roles(roles)
                        .build();
                jwt.encode(&claims).map_err(|e| {
                    AuthError::internal(format!("Failed to encode access token: {e}"))
                })?
            }
            None => generate_token(),
        };

        let record = AccessTokenRecord {
            id: record_id,
            token_hash: hash_token(&access_token),
            client_id: client.client_id.clone(),
            user_id: user_id.map(ToString::to_string),
            scope: scope.to_string(),
            is_active: true,
            expires_at: now + Duration::seconds(lifetime),
            created_at: now,
            revoked_at: None,
        };
        self.access_token_storage.create(&record).await?;

        Ok((access_token, record_id, lifetime))
    }

    /// Mints and stores a refresh token with an explicit expiry, returning
    /// the plaintext.
    async fn mint_refresh_token(
        &self,
        client: &Client,
        user_id: Option<&str>,
        scope: &str,
        access_token_id: Uuid,
        expires_at: OffsetDateTime,
    ) -> AuthResult<String> {
        let token_value = generate_token();
        let record = RefreshTokenRecord {
            id: Uuid::new_v4(),
            token_hash: hash_token(&token_value),
            access_token_id: Some(access_token_id),
            client_id: client.client_id.clone(),
            user_id: user_id.map(ToString::to_string),
            scope: scope.to_string(),
            is_active: true,
            expires_at,
            created_at: OffsetDateTime::now_utc(),
            revoked_at: None,
        };
        self.refresh_token_storage.create(&record).await?;

        Ok(token_value)
    }

    /// Mints an OIDC ID token. Requires a configured signer.
    fn mint_id_token(
        &self,
        client: &Client,
        user: &crate::types::User,
        nonce: Option<&str>,
    ) -> AuthResult<String> {
        let jwt = self.jwt_service.as_ref().ok_or_else(|| {
            AuthError::signer_unavailable("ID tokens require a configured signing key")
        })?;

        let now = OffsetDateTime::now_utc();
        let lifetime = client.id_token_lifetime.unwrap_or_else(|| {
            self.config.id_token_lifetime.as_secs() as i64
        });

        let claims = IdTokenClaims {
            iss: self.issuer.clone(),
            sub: user.id.clone(),
            aud: client.client_id.clone(),
            exp: (now + Duration::seconds(lifetime)).unix_timestamp(),
            iat: now.unix_timestamp(),
            nonce: nonce.map(ToString::to_string),
            name: user.name.clone(),
            preferred_username: Some(user.username.clone()),
            picture: user.picture.clone(),
            email: user.email.clone(),
            email_verified: Some(user.email_verified),
        };

        jwt.encode(&claims)
            .map_err(|e| AuthError::internal(format!("Failed to encode ID token: {e}")))
    }

    async fn audit(&self, event: AuditEvent) {
        if let Some(sink) = &self.audit_sink {
            sink.record(event).await;
        }
    }
}

// ============================================================================
// Tests
// ============================================================================
