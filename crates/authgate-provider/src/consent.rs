//! User consent management.
//!
//! [`ConsentService`] records and revokes a user's consent for a client to
//! receive a scope set. Consent checks during authorization are performed by
//! [`AuthorizationService`](crate::oauth::AuthorizationService); this service
//! owns the write side and the account-settings view.
//!
//! Revoking a consent also revokes the client's outstanding tokens for that
//! user, so a revocation takes effect at the resource server as soon as
//! introspection is consulted, not at the next authorization.

use std::sync::Arc;

use time::OffsetDateTime;
use uuid::Uuid;

use crate::AuthResult;
use crate::audit::{AuditEvent, AuditEventKind, AuditSink};
use crate::error::AuthError;
use crate::storage::{AccessTokenStorage, ConsentStorage, RefreshTokenStorage};
use crate::types::UserConsent;

/// Service for granting, revoking, and listing user consents.
pub struct ConsentService {
    storage: Arc<dyn ConsentStorage>,
    access_tokens: Arc<dyn AccessTokenStorage>,
    refresh_tokens: Arc<dyn RefreshTokenStorage>,
    audit_sink: Option<Arc<dyn AuditSink>>,
}

impl ConsentService {
    /// Creates a new consent service.
    #[must_use]
    pub fn new(
        storage: Arc<dyn ConsentStorage>,
        access_tokens: Arc<dyn AccessTokenStorage>,
        refresh_tokens: Arc<dyn RefreshTokenStorage>,
    ) -> Self {
        Self {
            storage,
            access_tokens,
            refresh_tokens,
            audit_sink: None,
        }
    }

    /// Attaches an audit sink.
    #[must_use]
    pub fn with_audit_sink(mut self, sink: Arc<dyn AuditSink>) -> Self {
        self.audit_sink = Some(sink);
        self
    }

    /// Records a user's consent for a client to receive the given scopes.
    ///
    /// Granting replaces any earlier record for the (user, client) pair and
    /// clears its revocation marker, so re-consenting after a revocation
    /// works without a separate restore step.
    ///
    /// # Errors
    ///
    /// Returns `InvalidRequest` for an empty scope set, or a storage error.
    pub async fn grant(
        &self,
        user_id: &str,
        client_id: &str,
        scopes: Vec<String>,
    ) -> AuthResult<UserConsent> {
        if scopes.is_empty() {
            return Err(AuthError::invalid_request(
                "Consent requires at least one scope",
            ));
        }

        let consent = UserConsent {
            id: Uuid::new_v4(),
            user_id: user_id.to_string(),
            client_id: client_id.to_string(),
            scopes,
            granted_at: OffsetDateTime::now_utc(),
            revoked_at: None,
        };
        self.storage.upsert(&consent).await?;

        tracing::info!(user_id, client_id, "consent granted");
        self.audit(
            AuditEvent::new(AuditEventKind::ConsentGranted)
                .with_client(client_id)
                .with_user(user_id)
                .with_scope(consent.scopes.join(" ")),
        )
        .await;

        Ok(consent)
    }

    /// Revokes a user's consent for a client and the tokens issued under it.
    ///
    /// Token revocation runs before the consent record is marked: if the
    /// consent write then fails, the worst case is revoked tokens under a
    /// still-standing consent, never live tokens under a revoked one. Token
    /// cleanup failures are logged and do not block the revocation.
    ///
    /// # Errors
    ///
    /// Returns an error when no consent record exists or the consent write
    /// fails.
    pub async fn revoke(&self, user_id: &str, client_id: &str) -> AuthResult<()> {
        match self
            .access_tokens
            .revoke_by_user_and_client(user_id, client_id)
            .await
        {
            Ok(count) => tracing::debug!(count, "revoked access tokens with consent"),
            Err(err) => {
                tracing::warn!(error = %err, "failed to revoke access tokens with consent");
            }
        }
        match self
            .refresh_tokens
            .revoke_by_user_and_client(user_id, client_id)
            .await
        {
            Ok(count) => tracing::debug!(count, "revoked refresh tokens with consent"),
            Err(err) => {
                tracing::warn!(error = %err, "failed to revoke refresh tokens with consent");
            }
        }

        self.storage.revoke(user_id, client_id).await?;

        tracing::info!(user_id, client_id, "consent revoked");
        self.audit(
            AuditEvent::new(AuditEventKind::ConsentRevoked)
                .with_client(client_id)
                .with_user(user_id),
        )
        .await;

        Ok(())
    }

    /// Returns the unrevoked consent for a (user, client) pair, if any.
    ///
    /// # Errors
    ///
    /// Returns an error if the storage operation fails.
    pub async fn find(&self, user_id: &str, client_id: &str) -> AuthResult<Option<UserConsent>> {
        Ok(self
            .storage
            .find(user_id, client_id)
            .await?
            .filter(|consent| !consent.is_revoked()))
    }

    /// Lists all unrevoked consents granted by a user.
    ///
    /// # Errors
    ///
    /// Returns an error if the storage operation fails.
    pub async fn list(&self, user_id: &str) -> AuthResult<Vec<UserConsent>> {
        self.storage.list_by_user(user_id).await
    }

    async fn audit(&self, event: AuditEvent) {
        if let Some(sink) = &self.audit_sink {
            sink.record(event).await;
        }
    }
}
