//! Access and refresh token records.
//!
//! Tokens are opaque high-entropy strings. The store holds only their
//! SHA-256 hex digest; the plaintext leaves the server once, in the token
//! response, and is never re-derivable afterwards. Revocation flips
//! `is_active` rather than deleting the record.

use base64::Engine;
use base64::engine::general_purpose::URL_SAFE_NO_PAD;
use rand::RngCore;
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use time::OffsetDateTime;
use uuid::Uuid;

/// Generates a new opaque token: 32 random bytes, URL-safe base64 without
/// padding (43 characters).
#[must_use]
pub fn generate_token() -> String {
    let mut bytes = [0u8; 32];
    rand::thread_rng().fill_bytes(&mut bytes);
    URL_SAFE_NO_PAD.encode(bytes)
}

/// Computes the storage digest of a token: lowercase hex SHA-256.
#[must_use]
pub fn hash_token(token: &str) -> String {
    let mut hasher = Sha256::new();
    hasher.update(token.as_bytes());
    hex::encode(hasher.finalize())
}

/// Stored access token record, indexed by token hash.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AccessTokenRecord {
    /// Internal record identifier.
    pub id: Uuid,

    /// SHA-256 hex digest of the token. Never the plaintext.
    #[serde(skip)]
    pub token_hash: String,

    /// Client the token was issued to.
    pub client_id: String,

    /// Resource owner, absent for client_credentials tokens.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub user_id: Option<String>,

    /// Granted scope, space-separated.
    pub scope: String,

    /// Cleared on revocation.
    pub is_active: bool,

    /// Expiry instant.
    #[serde(with = "time::serde::rfc3339")]
    pub expires_at: OffsetDateTime,

    /// Issuance instant.
    #[serde(with = "time::serde::rfc3339")]
    pub created_at: OffsetDateTime,

    /// When the token was revoked, if ever.
    #[serde(skip_serializing_if = "Option::is_none")]
    #[serde(with = "time::serde::rfc3339::option")]
    #[serde(default)]
    pub revoked_at: Option<OffsetDateTime>,
}

impl AccessTokenRecord {
    /// Returns `true` if the token is past its expiry.
    #[must_use]
    pub fn is_expired(&self) -> bool {
        OffsetDateTime::now_utc() >= self.expires_at
    }

    /// Returns `true` if the token has been revoked.
    #[must_use]
    pub fn is_revoked(&self) -> bool {
        !self.is_active || self.revoked_at.is_some()
    }

    /// Returns `true` if the token is active, unrevoked, and unexpired.
    #[must_use]
    pub fn is_valid(&self) -> bool {
        !self.is_revoked() && !self.is_expired()
    }
}

/// Stored refresh token record, indexed by token hash.
///
/// Rotation invariant: using a refresh token revokes it before its successor
/// is created, so no two valid tokens of the same lineage coexist.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RefreshTokenRecord {
    /// Internal record identifier.
    pub id: Uuid,

    /// SHA-256 hex digest of the token. Never the plaintext.
    #[serde(skip)]
    pub token_hash: String,

    /// Access token minted alongside this refresh token.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub access_token_id: Option<Uuid>,

    /// Client the token was issued to.
    pub client_id: String,

    /// Resource owner.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub user_id: Option<String>,

    /// Granted scope, space-separated.
    pub scope: String,

    /// Cleared on revocation/rotation.
    pub is_active: bool,

    /// Expiry instant.
    #[serde(with = "time::serde::rfc3339")]
    pub expires_at: OffsetDateTime,

    /// Issuance instant.
    #[serde(with = "time::serde::rfc3339")]
    pub created_at: OffsetDateTime,

    /// When the token was revoked, if ever.
    #[serde(skip_serializing_if = "Option::is_none")]
    #[serde(with = "time::serde::rfc3339::option")]
    #[serde(default)]
    pub revoked_at: Option<OffsetDateTime>,
}

impl RefreshTokenRecord {
    /// Returns `true` if the token is past its expiry.
    #[must_use]
    pub fn is_expired(&self) -> bool {
        OffsetDateTime::now_utc() >= self.expires_at
    }

    /// Returns `true` if the token has been revoked.
    #[must_use]
    pub fn is_revoked(&self) -> bool {
        !self.is_active || self.revoked_at.is_some()
    }

    /// Returns `true` if the token is active, unrevoked, and unexpired.
    #[must_use]
    pub fn is_valid(&self) -> bool {
        !self.is_revoked() && !self.is_expired()
    }
}
