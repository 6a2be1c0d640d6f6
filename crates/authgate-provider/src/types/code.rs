//! Authorization code record.
//!
//! A one-time credential binding client, user, redirect URI, scope, and the
//! PKCE challenge presented at authorization time. Stored by hash; the
//! plaintext code is returned to the caller exactly once. The `used` flag is
//! monotonic: false to true only, flipped atomically by the storage layer.

use serde::{Deserialize, Serialize};
use time::OffsetDateTime;
use uuid::Uuid;

use crate::oauth::pkce::PkceChallengeMethod;

/// Stored authorization code, indexed by code hash.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AuthorizationCode {
    /// Internal record identifier.
    pub id: Uuid,

    /// SHA-256 hex digest of the code. Never the plaintext.
    #[serde(skip)]
    pub code_hash: String,

    /// Client the code was issued to.
    pub client_id: String,

    /// Resource owner who authorized the request.
    pub user_id: String,

    /// Redirect URI the code is bound to; exchange must present the same one.
    pub redirect_uri: String,

    /// Granted scope, space-separated.
    pub scope: String,

    /// PKCE challenge recorded at authorization time.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub code_challenge: Option<String>,

    /// Method the challenge was derived with.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub code_challenge_method: Option<PkceChallengeMethod>,

    /// OIDC nonce echoed into the ID token.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub nonce: Option<String>,

    /// Whether the code has been exchanged. Monotonic.
    pub used: bool,

    /// Expiry instant (short, ~10 minutes).
    #[serde(with = "time::serde::rfc3339")]
    pub expires_at: OffsetDateTime,

    /// Issuance instant.
    #[serde(with = "time::serde::rfc3339")]
    pub created_at: OffsetDateTime,
}

impl AuthorizationCode {
    /// Returns `true` if the code is past its expiry.
    #[must_use]
    pub fn is_expired(&self) -> bool {
        OffsetDateTime::now_utc() >= self.expires_at
    }

    /// Returns `true` if the code is unused and unexpired.
    #[must_use]
    pub fn is_valid(&self) -> bool {
        !self.used && !self.is_expired()
    }
}
