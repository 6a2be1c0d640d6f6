//! Token endpoint types.
//!
//! # Supported Grant Types
//!
//! - `authorization_code` - Exchange authorization code for tokens
//! - `client_credentials` - Machine-to-machine authentication
//! - `refresh_token` - Rotate a refresh token into a new token pair
//! - `urn:ietf:params:oauth:grant-type:device_code` - Device flow polling

use serde::{Deserialize, Serialize};
use std::fmt;

/// Token request parameters.
///
/// This structure handles all supported grant types. Different fields are
/// required depending on the `grant_type`:
///
/// - `authorization_code`: code, redirect_uri, code_verifier (when PKCE was
///   used), client_id
/// - `client_credentials`: (optional) scope
/// - `refresh_token`: refresh_token
/// - device code grant: device_code, client_id
///
/// # Client Authentication
///
/// Clients authenticate using one of:
/// - HTTP Basic Auth header (not in this struct)
/// - `client_id` + `client_secret` in body
/// - `client_id` only (public clients)
#[derive(Debug, Clone, Deserialize)]
pub struct TokenRequest {
    /// OAuth 2.0 grant type.
    pub grant_type: String,

    /// Authorization code (for authorization_code grant).
    #[serde(default)]
    pub code: Option<String>,

    /// Redirect URI (must match the authorization request).
    #[serde(default)]
    pub redirect_uri: Option<String>,

    /// PKCE code verifier (for authorization_code grant).
    #[serde(default)]
    pub code_verifier: Option<String>,

    /// Client ID (for public clients or client_secret_post).
    #[serde(default)]
    pub client_id: Option<String>,

    /// Client secret (for client_secret_post authentication).
    #[serde(default)]
    pub client_secret: Option<String>,

    /// Refresh token (for refresh_token grant).
    #[serde(default)]
    pub refresh_token: Option<String>,

    /// Device code (for the device code grant).
    #[serde(default)]
    pub device_code: Option<String>,

    /// Requested scope (for client_credentials grant).
    #[serde(default)]
    pub scope: Option<String>,
}

/// Successful token response.
///
/// # Example Response
///
/// ```json
/// {
///   "access_token": "eyJhbG...",
///   "token_type": "Bearer",
///   "expires_in": 900,
///   "scope": "openid profile",
///   "refresh_token": "abc123...",
///   "id_token": "eyJhbG..."
/// }
/// ```
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TokenResponse {
    /// The access token (JWT in full mode, opaque otherwise).
    pub access_token: String,

    /// Token type, always "Bearer".
    pub token_type: String,

    /// Access token lifetime in seconds.
    pub expires_in: u64,

    /// Granted scopes (space-separated).
    pub scope: String,

    /// Refresh token. Absent for client_credentials.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub refresh_token: Option<String>,

    /// ID token (if openid scope was granted to a user-bound grant).
    #[serde(skip_serializing_if = "Option::is_none")]
    pub id_token: Option<String>,
}

impl TokenResponse {
    /// Creates a new token response with required fields.
    #[must_use]
    pub fn new(access_token: String, expires_in: u64, scope: String) -> Self {
        Self {
            access_token,
            token_type: "Bearer".to_string(),
            expires_in,
            scope,
            refresh_token: None,
            id_token: None,
        }
    }

    /// Sets the refresh token.
    #[must_use]
    pub fn with_refresh_token(mut self, token: String) -> Self {
        self.refresh_token = Some(token);
        self
    }

    /// Sets the ID token.
    #[must_use]
    pub fn with_id_token(mut self, token: String) -> Self {
        self.id_token = Some(token);
        self
    }
}

/// Token error response.
///
/// # Example Response
///
/// ```json
/// {
///   "error": "invalid_grant",
///   "error_description": "Authorization code expired"
/// }
/// ```
#[derive(Debug, Clone, Serialize)]
pub struct TokenError {
    /// OAuth 2.0 error code.
    pub error: TokenErrorCode,

    /// Human-readable error description.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error_description: Option<String>,
}

impl TokenError {
    /// Creates a new token error.
    #[must_use]
    pub fn new(error: TokenErrorCode) -> Self {
        Self {
            error,
            error_description: None,
        }
    }

    /// Creates a new token error with description.
    #[must_use]
    pub fn with_description(error: TokenErrorCode, description: impl Into<String>) -> Self {
        Self {
            error,
            error_description: Some(description.into()),
        }
    }

    /// Creates an invalid_request error.
    #[must_use]
    pub fn invalid_request(description: impl Into<String>) -> Self {
        Self::with_description(TokenErrorCode::InvalidRequest, description)
    }

    /// Creates an invalid_client error.
    #[must_use]
    pub fn invalid_client(description: impl Into<String>) -> Self {
        Self::with_description(TokenErrorCode::InvalidClient, description)
    }

    /// Creates an invalid_grant error.
    #[must_use]
    pub fn invalid_grant(description: impl Into<String>) -> Self {
        Self::with_description(TokenErrorCode::InvalidGrant, description)
    }

    /// Creates an unauthorized_client error.
    #[must_use]
    pub fn unauthorized_client(description: impl Into<String>) -> Self {
        Self::with_description(TokenErrorCode::UnauthorizedClient, description)
    }

    /// Creates an unsupported_grant_type error.
    #[must_use]
    pub fn unsupported_grant_type(description: impl Into<String>) -> Self {
        Self::with_description(TokenErrorCode::UnsupportedGrantType, description)
    }

    /// Creates an invalid_scope error.
    #[must_use]
    pub fn invalid_scope(description: impl Into<String>) -> Self {
        Self::with_description(TokenErrorCode::InvalidScope, description)
    }

    /// Creates an authorization_pending error (device flow).
    #[must_use]
    pub fn authorization_pending() -> Self {
        Self::new(TokenErrorCode::AuthorizationPending)
    }

    /// Creates a slow_down error (device flow).
    #[must_use]
    pub fn slow_down() -> Self {
        Self::new(TokenErrorCode::SlowDown)
    }

    /// Creates an expired_token error (device flow).
    #[must_use]
    pub fn expired_token() -> Self {
        Self::new(TokenErrorCode::ExpiredToken)
    }
}

/// OAuth 2.0 token error codes.
///
/// RFC 6749 Section 5.2 plus the device flow codes from RFC 8628 Section 3.5.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TokenErrorCode {
    /// The request is missing a required parameter, includes an unsupported
    /// parameter value, or is otherwise malformed.
    InvalidRequest,

    /// Client authentication failed (unknown client, no client authentication
    /// included, or unsupported authentication method).
    InvalidClient,

    /// The provided authorization grant or refresh token is invalid, expired,
    /// revoked, or was issued to another client.
    InvalidGrant,

    /// The authenticated client is not authorized to use this authorization
    /// grant type.
    UnauthorizedClient,

    /// The authorization grant type is not supported by the authorization
    /// server.
    UnsupportedGrantType,

    /// The requested scope is invalid, unknown, malformed, or exceeds the
    /// scope granted by the resource owner.
    InvalidScope,

    /// The user denied the device authorization request.
    AccessDenied,

    /// Device flow: the user has not yet approved or denied the request.
    AuthorizationPending,

    /// Device flow: the device is polling faster than the stated interval.
    SlowDown,

    /// Device flow: the device code has expired.
    ExpiredToken,

    /// The authorization server encountered an unexpected condition.
    ServerError,
}

impl TokenErrorCode {
    /// Returns the string representation of the error code.
    #[must_use]
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::InvalidRequest => "invalid_request",
            Self::InvalidClient => "invalid_client",
            Self::InvalidGrant => "invalid_grant",
            Self::UnauthorizedClient => "unauthorized_client",
            Self::UnsupportedGrantType => "unsupported_grant_type",
            Self::InvalidScope => "invalid_scope",
            Self::AccessDenied => "access_denied",
            Self::AuthorizationPending => "authorization_pending",
            Self::SlowDown => "slow_down",
            Self::ExpiredToken => "expired_token",
            Self::ServerError => "server_error",
        }
    }

    /// Returns the HTTP status code for this error.
    #[must_use]
    pub fn http_status(&self) -> u16 {
        match self {
            Self::InvalidClient => 401,
            Self::ServerError => 500,
            Self::InvalidRequest
            | Self::InvalidGrant
            | Self::UnauthorizedClient
            | Self::UnsupportedGrantType
            | Self::InvalidScope
            | Self::AccessDenied
            | Self::AuthorizationPending
            | Self::SlowDown
            | Self::ExpiredToken => 400,
        }
    }
}

impl fmt::Display for TokenErrorCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_token_request_authorization_code() {
        let json = r#"{
            "grant_type": "authorization_code",
            "code": "SplxlOBeZQQYbYS6WxSbIA",
            "redirect_uri": "https://app.example.com/callback",
            "code_verifier": "dBjftJeZ4CVP-mB92K27uhbUJU1p1r_wW1gFWFOEjXk",
            "client_id": "agw_h1WUMvCVQupLkB4z"
        }"#;

        let request: TokenRequest = serde_json::from_str(json).unwrap();
        assert_eq!(request.grant_type, "authorization_code");
        assert_eq!(request.code, Some("SplxlOBeZQQYbYS6WxSbIA".to_string()));
        assert_eq!(
            request.code_verifier,
            Some("dBjftJeZ4CVP-mB92K27uhbUJU1p1r_wW1gFWFOEjXk".to_string())
        );
        assert!(request.client_secret.is_none());
        assert!(request.refresh_token.is_none());
        assert!(request.device_code.is_none());
    }

    #[test]
    fn test_token_request_device_code() {
        let json = r#"{
            "grant_type": "urn:ietf:params:oauth:grant-type:device_code",
            "device_code": "GmRhmhcxhwAzkoEqiMEg_DnyEysNkuNhszIySk9eS",
            "client_id": "agw_h1WUMvCVQupLkB4z"
        }"#;

        let request: TokenRequest = serde_json::from_str(json).unwrap();
        assert_eq!(
            request.grant_type,
            "urn:ietf:params:oauth:grant-type:device_code"
        );
        assert!(request.device_code.is_some());
    }

    #[test]
    fn test_token_request_client_credentials() {
        let json = r#"{
            "grant_type": "client_credentials",
            "client_id": "agw_h1WUMvCVQupLkB4z",
            "client_secret": "agws_secret",
            "scope": "api:read"
        }"#;

        let request: TokenRequest = serde_json::from_str(json).unwrap();
        assert_eq!(request.grant_type, "client_credentials");
        assert_eq!(request.scope, Some("api:read".to_string()));
    }

    #[test]
    fn test_token_response_serialization() {
        let response = TokenResponse::new(
            "eyJhbGciOiJSUzI1NiIsInR5cCI6IkpXVCJ9...".to_string(),
            900,
            "openid profile".to_string(),
        );

        let json = serde_json::to_string(&response).unwrap();
        assert!(json.contains(r#""token_type":"Bearer""#));
        assert!(json.contains(r#""expires_in":900"#));
        assert!(json.contains(r#""scope":"openid profile""#));
        // Optional fields absent when unset
        assert!(!json.contains(r#""refresh_token":"#));
        assert!(!json.contains(r#""id_token":"#));
    }

    #[test]
    fn test_token_response_with_optional_fields() {
        let response = TokenResponse::new("access-token".to_string(), 900, "openid".to_string())
            .with_refresh_token("refresh-token".to_string())
            .with_id_token("id-token".to_string());

        let json = serde_json::to_string(&response).unwrap();
        assert!(json.contains(r#""refresh_token":"refresh-token""#));
        assert!(json.contains(r#""id_token":"id-token""#));
    }

    #[test]
    fn test_token_error_serialization() {
        let error = TokenError::invalid_grant("Authorization code expired");

        let json = serde_json::to_string(&error).unwrap();
        assert!(json.contains(r#""error":"invalid_grant""#));
        assert!(json.contains(r#""error_description":"Authorization code expired""#));
    }

    #[test]
    fn test_token_error_without_description() {
        let error = TokenError::authorization_pending();

        let json = serde_json::to_string(&error).unwrap();
        assert!(json.contains(r#""error":"authorization_pending""#));
        assert!(!json.contains("error_description"));
    }

    #[test]
    fn test_error_code_as_str() {
        assert_eq!(TokenErrorCode::InvalidRequest.as_str(), "invalid_request");
        assert_eq!(TokenErrorCode::InvalidClient.as_str(), "invalid_client");
        assert_eq!(
            TokenErrorCode::AuthorizationPending.as_str(),
            "authorization_pending"
        );
        assert_eq!(TokenErrorCode::SlowDown.as_str(), "slow_down");
        assert_eq!(TokenErrorCode::ExpiredToken.as_str(), "expired_token");
    }

    #[test]
    fn test_error_code_http_status() {
        assert_eq!(TokenErrorCode::InvalidRequest.http_status(), 400);
        assert_eq!(TokenErrorCode::InvalidClient.http_status(), 401);
        assert_eq!(TokenErrorCode::AuthorizationPending.http_status(), 400);
        assert_eq!(TokenErrorCode::ServerError.http_status(), 500);
    }

    #[test]
    fn test_error_code_serde() {
        assert_eq!(
            serde_json::to_string(&TokenErrorCode::SlowDown).unwrap(),
            r#""slow_down""#
        );
        let code: TokenErrorCode = serde_json::from_str(r#""expired_token""#).unwrap();
        assert_eq!(code, TokenErrorCode::ExpiredToken);
    }
}
