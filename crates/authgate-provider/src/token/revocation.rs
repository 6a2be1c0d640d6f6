//! Token revocation (RFC 7009).
//!
//! The revocation endpoint always reports success, even for unknown or
//! already-revoked tokens, so callers cannot probe for token existence.

use serde::{Deserialize, Serialize};

/// Token revocation request per RFC 7009.
#[derive(Debug, Clone, Deserialize)]
pub struct RevocationRequest {
    /// The token to revoke, as originally issued to the client.
    pub token: String,

    /// Optional hint about the token type.
    ///
    /// The server tries the other store when the hint turns out to be
    /// wrong, so an incorrect hint only costs an extra lookup.
    #[serde(default)]
    pub token_type_hint: Option<TokenTypeHint>,
}

impl RevocationRequest {
    /// Creates a revocation request without a type hint.
    #[must_use]
    pub fn new(token: impl Into<String>) -> Self {
        Self {
            token: token.into(),
            token_type_hint: None,
        }
    }

    /// Sets the token type hint.
    #[must_use]
    pub fn with_hint(mut self, hint: TokenTypeHint) -> Self {
        self.token_type_hint = Some(hint);
        self
    }
}

/// Token type hint used by revocation and introspection requests.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum TokenTypeHint {
    /// The token is an access token.
    AccessToken,
    /// The token is a refresh token.
    RefreshToken,
}

impl TokenTypeHint {
    /// Returns the token type hint as a string.
    #[must_use]
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::AccessToken => "access_token",
            Self::RefreshToken => "refresh_token",
        }
    }
}

impl std::fmt::Display for TokenTypeHint {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}
