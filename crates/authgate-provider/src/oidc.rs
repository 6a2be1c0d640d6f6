//! OpenID Connect surface: discovery metadata and the userinfo projection.
//!
//! The discovery document is served at `/.well-known/openid-configuration`
//! and lets clients find every endpoint and capability without out-of-band
//! configuration. Userinfo claims are projected from the access token's
//! scopes by [`TokenService::userinfo`](crate::token::TokenService::userinfo).

use serde::{Deserialize, Serialize};

use crate::config::ProviderConfig;
use crate::token::jwt::SigningAlgorithm;
use crate::types::OIDC_SCOPES;

/// OIDC provider metadata, served at `/.well-known/openid-configuration`.
///
/// # Example Response
///
/// ```json
/// {
///   "issuer": "https://auth.example.com",
///   "authorization_endpoint": "https://auth.example.com/oauth/authorize",
///   "token_endpoint": "https://auth.example.com/oauth/token",
///   "grant_types_supported": ["authorization_code", "client_credentials"],
///   "code_challenge_methods_supported": ["S256", "plain"]
/// }
/// ```
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DiscoveryDocument {
    /// Issuer URL. Matches the `iss` claim in issued tokens.
    pub issuer: String,

    /// OAuth 2.0 authorization endpoint.
    pub authorization_endpoint: String,

    /// OAuth 2.0 token endpoint.
    pub token_endpoint: String,

    /// Device authorization endpoint (RFC 8628).
    pub device_authorization_endpoint: String,

    /// Token introspection endpoint (RFC 7662).
    pub introspection_endpoint: String,

    /// Token revocation endpoint (RFC 7009).
    pub revocation_endpoint: String,

    /// Userinfo endpoint.
    pub userinfo_endpoint: String,

    /// JSON Web Key Set URL.
    pub jwks_uri: String,

    /// Client registration endpoint.
    pub registration_endpoint: String,

    /// Supported scopes.
    pub scopes_supported: Vec<String>,

    /// Supported response types.
    pub response_types_supported: Vec<String>,

    /// Supported grant types.
    pub grant_types_supported: Vec<String>,

    /// Supported subject identifier types.
    pub subject_types_supported: Vec<String>,

    /// ID token signing algorithms. Empty when the provider runs without a
    /// signer and issues opaque tokens only.
    #[serde(skip_serializing_if = "Vec::is_empty", default)]
    pub id_token_signing_alg_values_supported: Vec<String>,

    /// Supported PKCE code challenge methods.
    pub code_challenge_methods_supported: Vec<String>,

    /// Supported token endpoint client authentication methods.
    pub token_endpoint_auth_methods_supported: Vec<String>,

    /// Claims the userinfo endpoint may return.
    pub claims_supported: Vec<String>,
}

impl DiscoveryDocument {
    /// Builds the discovery document from provider configuration.
    ///
    /// `signing_algorithm` is the algorithm of the active signing key, or
    /// `None` when the provider issues opaque tokens.
    #[must_use]
    pub fn build(config: &ProviderConfig, signing_algorithm: Option<SigningAlgorithm>) -> Self {
        let base = config.base_url.trim_end_matches('/');

        Self {
            issuer: config.issuer.clone(),
            authorization_endpoint: format!("{base}/oauth/authorize"),
            token_endpoint: format!("{base}/oauth/token"),
            device_authorization_endpoint: format!("{base}/oauth/device_authorization"),
            introspection_endpoint: format!("{base}/oauth/introspect"),
            revocation_endpoint: format!("{base}/oauth/revoke"),
            userinfo_endpoint: format!("{base}/oauth/userinfo"),
            jwks_uri: format!("{base}/.well-known/jwks.json"),
            registration_endpoint: format!("{base}/oauth/register"),
            scopes_supported: OIDC_SCOPES.iter().map(ToString::to_string).collect(),
            response_types_supported: vec!["code".to_string()],
            grant_types_supported: vec![
                "authorization_code".to_string(),
                "client_credentials".to_string(),
                "refresh_token".to_string(),
                "urn:ietf:params:oauth:grant-type:device_code".to_string(),
            ],
            subject_types_supported: vec!["public".to_string()],
            id_token_signing_alg_values_supported: signing_algorithm
                .map(|alg| vec![alg.as_str().to_string()])
                .unwrap_or_default(),
            code_challenge_methods_supported: vec!["S256".to_string(), "plain".to_string()],
            token_endpoint_auth_methods_supported: vec![
                "client_secret_basic".to_string(),
                "client_secret_post".to_string(),
                "none".to_string(),
            ],
            claims_supported: vec![
                "sub".to_string(),
                "name".to_string(),
                "preferred_username".to_string(),
                "picture".to_string(),
                "email".to_string(),
                "email_verified".to_string(),
                "updated_at".to_string(),
            ],
        }
    }
}

/// Userinfo endpoint response.
///
/// `sub` is always present; the remaining claims appear only when the access
/// token carries the scope that unlocks them (`profile`, `email`).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UserInfoResponse {
    /// Subject identifier.
    pub sub: String,

    /// Full display name (`profile` scope).
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,

    /// Preferred username (`profile` scope).
    #[serde(skip_serializing_if = "Option::is_none")]
    pub preferred_username: Option<String>,

    /// Profile picture URL (`profile` scope).
    #[serde(skip_serializing_if = "Option::is_none")]
    pub picture: Option<String>,

    /// Last profile update, as a Unix timestamp (`profile` scope).
    #[serde(skip_serializing_if = "Option::is_none")]
    pub updated_at: Option<i64>,

    /// Email address (`email` scope).
    #[serde(skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,

    /// Whether the email address has been verified (`email` scope).
    #[serde(skip_serializing_if = "Option::is_none")]
    pub email_verified: Option<bool>,

    /// Phone number (`phone` scope).
    #[serde(skip_serializing_if = "Option::is_none")]
    pub phone_number: Option<String>,

    /// Whether the phone number has been verified (`phone` scope).
    #[serde(skip_serializing_if = "Option::is_none")]
    pub phone_number_verified: Option<bool>,
}

impl UserInfoResponse {
    /// Creates a response carrying only the subject identifier.
    #[must_use]
    pub fn new(sub: impl Into<String>) -> Self {
        Self {
            sub: sub.into(),
            name: None,
            preferred_username: None,
            picture: None,
            updated_at: None,
            email: None,
            email_verified: None,
            phone_number: None,
            phone_number_verified: None,
        }
    }
}
