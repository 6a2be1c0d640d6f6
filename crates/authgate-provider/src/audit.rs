//! Audit events for token and consent lifecycle.
//!
//! Services emit an [`AuditEvent`] for every security-relevant state
//! change. The default sink writes structured log lines through `tracing`;
//! deployments that need durable audit trails implement [`AuditSink`]
//! against their own store.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use time::OffsetDateTime;

/// What happened.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AuditEventKind {
    ClientCreated,
    ClientUpdated,
    ClientDeleted,
    ClientSecretRotated,
    AuthorizationCodeIssued,
    AuthorizationCodeReplayed,
    TokensIssued,
    TokenRefreshed,
    TokenRevoked,
    PkceVerificationFailed,
    RefreshTokenReplayed,
    DeviceFlowStarted,
    DeviceCodeApproved,
    DeviceCodeDenied,
    ConsentGranted,
    ConsentRevoked,
}

impl AuditEventKind {
    /// Returns the event kind as a string.
    #[must_use]
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::ClientCreated => "client_created",
            Self::ClientUpdated => "client_updated",
            Self::ClientDeleted => "client_deleted",
            Self::ClientSecretRotated => "client_secret_rotated",
            Self::AuthorizationCodeIssued => "authorization_code_issued",
            Self::AuthorizationCodeReplayed => "authorization_code_replayed",
            Self::TokensIssued => "tokens_issued",
            Self::TokenRefreshed => "token_refreshed",
            Self::TokenRevoked => "token_revoked",
            Self::PkceVerificationFailed => "pkce_verification_failed",
            Self::RefreshTokenReplayed => "refresh_token_replayed",
            Self::DeviceFlowStarted => "device_flow_started",
            Self::DeviceCodeApproved => "device_code_approved",
            Self::DeviceCodeDenied => "device_code_denied",
            Self::ConsentGranted => "consent_granted",
            Self::ConsentRevoked => "consent_revoked",
        }
    }
}

/// A single audit record. Never carries token or code plaintext.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AuditEvent {
    pub kind: AuditEventKind,

    /// Client the event concerns.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub client_id: Option<String>,

    /// User the event concerns, when the grant is user-bound.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub user_id: Option<String>,

    /// Scope involved, space-separated.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub scope: Option<String>,

    /// When the event happened.
    #[serde(with = "time::serde::rfc3339")]
    pub at: OffsetDateTime,
}

impl AuditEvent {
    /// Creates an event stamped with the current time.
    #[must_use]
    pub fn new(kind: AuditEventKind) -> Self {
        Self {
            kind,
            client_id: None,
            user_id: None,
            scope: None,
            at: OffsetDateTime::now_utc(),
        }
    }

    /// Sets the client.
    #[must_use]
    pub fn with_client(mut self, client_id: impl Into<String>) -> Self {
        self.client_id = Some(client_id.into());
        self
    }

    /// Sets the user.
    #[must_use]
    pub fn with_user(mut self, user_id: impl Into<String>) -> Self {
        self.user_id = Some(user_id.into());
        self
    }

    /// Sets the scope.
    #[must_use]
    pub fn with_scope(mut self, scope: impl Into<String>) -> Self {
        self.scope = Some(scope.into());
        self
    }
}

/// Destination for audit events.
///
/// Recording is best-effort: sinks must not fail the operation that
/// produced the event, so `record` is infallible.
#[async_trait]
pub trait AuditSink: Send + Sync {
    async fn record(&self, event: AuditEvent);
}

/// Sink that writes audit events as structured `tracing` log lines.
#[derive(Debug, Default, Clone, Copy)]
pub struct TracingAuditSink;

#[async_trait]
impl AuditSink for TracingAuditSink {
    async fn record(&self, event: AuditEvent) {
        tracing::info!(
            target: "authgate::audit",
            kind = event.kind.as_str(),
            client_id = event.client_id.as_deref(),
            user_id = event.user_id.as_deref(),
            scope = event.scope.as_deref(),
            "audit event"
        );
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_event_builder() {
        let event = AuditEvent::new(AuditEventKind::TokensIssued)
            .with_client("agw_test")
            .with_user("user-1")
            .with_scope("openid profile");

        assert_eq!(event.kind, AuditEventKind::TokensIssued);
        assert_eq!(event.client_id.as_deref(), Some("agw_test"));
        assert_eq!(event.scope.as_deref(), Some("openid profile"));
    }

    #[test]
    fn test_kind_serialization() {
        assert_eq!(
            serde_json::to_string(&AuditEventKind::ConsentRevoked).unwrap(),
            r#""consent_revoked""#
        );
        assert_eq!(
            AuditEventKind::AuthorizationCodeReplayed.as_str(),
            "authorization_code_replayed"
        );
    }

    #[tokio::test]
    async fn test_tracing_sink_records() {
        // Must not panic or block
        TracingAuditSink
            .record(AuditEvent::new(AuditEventKind::ClientCreated).with_client("agw_test"))
            .await;
    }
}
