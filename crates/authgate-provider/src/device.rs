//! Device authorization flow (RFC 8628).
//!
//! [`DeviceService`] backs the device authorization endpoint and the user
//! verification page. The device receives a long `device_code` and a short
//! `user_code`; the user approves or denies the request in a browser while
//! the device polls the token endpoint
//! ([`TokenService`](crate::token::TokenService) handles the polling side).
//!
//! A device code moves through exactly one decision: `pending` transitions
//! to `authorized` or `denied` once, and the storage layer enforces that
//! atomically. Expiry is a time predicate, not a stored state.

use std::sync::Arc;

use time::{Duration, OffsetDateTime};
use uuid::Uuid;

use crate::AuthResult;
use crate::audit::{AuditEvent, AuditEventKind, AuditSink};
use crate::client::ClientService;
use crate::config::OAuthConfig;
use crate::error::AuthError;
use crate::oauth::device::{DeviceAuthorizationRequest, DeviceAuthorizationResponse};
use crate::storage::DeviceCodeStorage;
use crate::types::{
    Client, DeviceCodeRecord, DeviceCodeStatus, GrantType, generate_token, generate_user_code,
    hash_token,
};

/// Service behind the device authorization endpoint and verification page.
pub struct DeviceService {
    clients: Arc<ClientService>,
    storage: Arc<dyn DeviceCodeStorage>,
    audit_sink: Option<Arc<dyn AuditSink>>,
    base_url: String,
    config: OAuthConfig,
}

impl DeviceService {
    /// Creates a new device flow service.
    ///
    /// `base_url` is the public server URL used to build verification URIs.
    #[must_use]
    pub fn new(
        clients: Arc<ClientService>,
        storage: Arc<dyn DeviceCodeStorage>,
        base_url: impl Into<String>,
        config: OAuthConfig,
    ) -> Self {
        Self {
            clients,
            storage,
            audit_sink: None,
            base_url: base_url.into(),
            config,
        }
    }

    /// Attaches an audit sink.
    #[must_use]
    pub fn with_audit_sink(mut self, sink: Arc<dyn AuditSink>) -> Self {
        self.audit_sink = Some(sink);
        self
    }

    /// Starts a device authorization.
    ///
    /// The device code is returned in plaintext exactly once and stored as a
    /// SHA-256 digest; the user code is stored as entered since it is short
    /// and bound to the same record.
    ///
    /// # Errors
    ///
    /// Returns `InvalidClient` for an unknown or inactive client,
    /// `UnauthorizedClient` when the client is not allowed the device grant,
    /// and `InvalidScope` when the requested scope exceeds the allowed set.
    pub async fn start(
        &self,
        request: &DeviceAuthorizationRequest,
    ) -> AuthResult<DeviceAuthorizationResponse> {
        let client = self.clients.get(&request.client_id).await?;
        if !client.is_active {
            return Err(AuthError::invalid_client("Client authentication failed"));
        }
        if !client.is_grant_type_allowed(GrantType::DeviceCode) {
            return Err(AuthError::unauthorized_client(
                "Client is not allowed the device_code grant",
            ));
        }

        let scope = self.resolve_scope(request.scope.as_deref(), &client)?;

        let device_code = generate_token();
        let user_code = generate_user_code();
        let verification_uri = format!("{}/device", self.base_url.trim_end_matches('/'));
        let verification_uri_complete = format!("{verification_uri}?user_code={user_code}");

        let now = OffsetDateTime::now_utc();
        let lifetime = self.config.device_code_lifetime.as_secs();
        let interval = self.config.device_poll_interval.as_secs();

        let record = DeviceCodeRecord {
            id: Uuid::new_v4(),
            device_code_hash: hash_token(&device_code),
            user_code: user_code.clone(),
            client_id: client.client_id.clone(),
            user_id: None,
            scope,
            status: DeviceCodeStatus::Pending,
            verification_uri: verification_uri.clone(),
            verification_uri_complete: verification_uri_complete.clone(),
            expires_at: now + Duration::seconds(lifetime as i64),
            interval,
            last_polled_at: None,
            created_at: now,
        };
        self.storage.create(&record).await?;

        tracing::debug!(client_id = %client.client_id, user_code = %user_code, "device flow started");
        self.audit(
            AuditEvent::new(AuditEventKind::DeviceFlowStarted)
                .with_client(client.client_id.as_str())
                .with_scope(record.scope.as_str()),
        )
        .await;

        Ok(DeviceAuthorizationResponse {
            device_code,
            user_code,
            verification_uri,
            verification_uri_complete,
            expires_in: lifetime,
            interval,
        })
    }

    /// Looks up the pending request for a user code, for rendering the
    /// verification page.
    ///
    /// # Errors
    ///
    /// Returns `InvalidGrant` when the code is unknown, expired, or already
    /// decided.
    pub async fn pending_request(&self, user_code: &str) -> AuthResult<DeviceCodeRecord> {
        let record = self
            .storage
            .find_by_user_code(user_code)
            .await?
            .ok_or_else(|| AuthError::invalid_grant("Unknown user code"))?;

        if record.is_expired() {
            return Err(AuthError::invalid_grant("Device code expired"));
        }
        if !record.is_pending() {
            return Err(AuthError::invalid_grant("Device code already processed"));
        }

        Ok(record)
    }

    /// Records the user's approval of a device authorization.
    ///
    /// The transition is atomic in storage: only a pending record can be
    /// approved, so a second decision against the same code fails.
    ///
    /// # Errors
    ///
    /// Returns `InvalidGrant` when the code is unknown, expired, or already
    /// decided.
    pub async fn approve(&self, user_code: &str, user_id: &str) -> AuthResult<DeviceCodeRecord> {
        // Expiry check up front; the store only enforces pending status
        let pending = self.pending_request(user_code).await?;

        let record = self
            .storage
            .transition(user_code, DeviceCodeStatus::Authorized, Some(user_id))
            .await?;

        tracing::info!(client_id = %pending.client_id, "device authorization approved");
        self.audit(
            AuditEvent::new(AuditEventKind::DeviceCodeApproved)
                .with_client(pending.client_id.as_str())
                .with_user(user_id)
                .with_scope(pending.scope.as_str()),
        )
        .await;

        Ok(record)
    }

    /// Records the user's denial of a device authorization.
    ///
    /// # Errors
    ///
    /// Returns `InvalidGrant` when the code is unknown, expired, or already
    /// decided.
    pub async fn deny(&self, user_code: &str) -> AuthResult<DeviceCodeRecord> {
        let pending = self.pending_request(user_code).await?;

        let record = self
            .storage
            .transition(user_code, DeviceCodeStatus::Denied, None)
            .await?;

        tracing::info!(client_id = %pending.client_id, "device authorization denied");
        self.audit(
            AuditEvent::new(AuditEventKind::DeviceCodeDenied)
                .with_client(pending.client_id.as_str()),
        )
        .await;

        Ok(record)
    }

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

    async fn audit(&self, event: AuditEvent) {
        if let Some(sink) = &self.audit_sink {
            sink.record(event).await;
        }
    }
}
