//! Session bridge trait.
//!
//! Links OAuth token lifecycle events to the surrounding application's
//! login sessions. Sessions are keyed by token hash so one device can be
//! signed out without touching the user's other sessions.
//!
//! Every call through this bridge is best-effort: the token operation that
//! triggered it has already committed, so bridge failures are logged and
//! swallowed by the caller, never propagated.

use async_trait::async_trait;
use time::OffsetDateTime;

use crate::AuthResult;

/// Token hashes a login session is bound to.
#[derive(Debug, Clone)]
pub struct SessionBinding {
    /// Subject the session belongs to.
    pub user_id: String,

    /// Hash of the access token minted with the session.
    pub access_token_hash: String,

    /// Hash of the refresh token, when one was issued.
    pub refresh_token_hash: Option<String>,

    /// Session expiry: the refresh token expiry when one exists, otherwise
    /// the access token expiry.
    pub expires_at: OffsetDateTime,
}

/// Best-effort hooks into the host application's session store.
#[async_trait]
pub trait SessionBridge: Send + Sync {
    /// Opens a session for freshly issued user-bound tokens.
    ///
    /// # Errors
    ///
    /// Returns an error if the session store is unavailable. Callers treat
    /// this as a warning, not a failure of the issuance.
    async fn create_session(&self, binding: &SessionBinding) -> AuthResult<()>;

    /// Rebinds a session from a consumed token hash to its successors
    /// after a refresh.
    ///
    /// # Errors
    ///
    /// Returns an error if the session store is unavailable. Callers treat
    /// this as a warning, not a failure of the refresh.
    async fn refresh_session(
        &self,
        old_token_hash: &str,
        binding: &SessionBinding,
    ) -> AuthResult<()>;

    /// Tears down the session bound to a token hash after that token is
    /// revoked. Returns the number of sessions terminated.
    ///
    /// # Errors
    ///
    /// Returns an error if the session store is unavailable. Callers treat
    /// this as a warning, not a failure of the revocation.
    async fn revoke_session_by_token_hash(&self, token_hash: &str) -> AuthResult<u64>;
}
