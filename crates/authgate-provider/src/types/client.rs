//! OAuth 2.0 client domain types.
//!
//! The `Client` record is the registry entry for an OAuth client: its
//! identity, type, allowed flows and scopes, token lifetimes, and the
//! PKCE/consent flags the grant handlers consult.

use serde::{Deserialize, Serialize};
use time::OffsetDateTime;
use uuid::Uuid;

// =============================================================================
// Client Type
// =============================================================================

/// OAuth 2.0 client type per RFC 6749 Section 2.1.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ClientType {
    /// Client that can keep a secret (backend services).
    Confidential,
    /// Client that cannot keep a secret (SPAs, native apps, devices).
    Public,
}

impl ClientType {
    /// Returns the client type as a string.
    #[must_use]
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Confidential => "confidential",
            Self::Public => "public",
        }
    }
}

impl std::fmt::Display for ClientType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

// =============================================================================
// Grant Type
// =============================================================================

/// OAuth 2.0 grant types.
///
/// Defines the authorization flows a client is allowed to use.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum GrantType {
    /// Authorization Code flow (with PKCE for public clients).
    AuthorizationCode,
    /// Client Credentials flow (confidential clients only).
    ClientCredentials,
    /// Refresh Token flow.
    RefreshToken,
    /// Device Authorization flow (RFC 8628).
    #[serde(rename = "urn:ietf:params:oauth:grant-type:device_code")]
    DeviceCode,
}

impl GrantType {
    /// Returns the OAuth 2.0 `grant_type` parameter value.
    #[must_use]
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::AuthorizationCode => "authorization_code",
            Self::ClientCredentials => "client_credentials",
            Self::RefreshToken => "refresh_token",
            Self::DeviceCode => "urn:ietf:params:oauth:grant-type:device_code",
        }
    }

    /// Parses a `grant_type` parameter value.
    #[must_use]
    pub fn parse(value: &str) -> Option<Self> {
        match value {
            "authorization_code" => Some(Self::AuthorizationCode),
            "client_credentials" => Some(Self::ClientCredentials),
            "refresh_token" => Some(Self::RefreshToken),
            "urn:ietf:params:oauth:grant-type:device_code" => Some(Self::DeviceCode),
            _ => None,
        }
    }
}

impl std::fmt::Display for GrantType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

// =============================================================================
// Client
// =============================================================================

/// OAuth 2.0 client registration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Client {
    /// Internal record identifier.
    pub id: Uuid,

    /// Unique client identifier used in OAuth flows (`agw_` prefixed).
    pub client_id: String,

    /// Argon2 hash of the client secret. Confidential clients always carry
    /// one; public clients never do. Never serialized.
    #[serde(skip)]
    pub client_secret_hash: Option<String>,

    /// Human-readable display name.
    pub name: String,

    /// Detailed description of the client application.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,

    /// Logo URL shown on the consent screen.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub logo_url: Option<String>,

    /// Public or confidential.
    pub client_type: ClientType,

    /// Allowed redirect URIs. Matching is exact, no prefix or wildcard.
    #[serde(default)]
    pub redirect_uris: Vec<String>,

    /// Grant types this client is allowed to use.
    pub allowed_grant_types: Vec<GrantType>,

    /// Scopes this client is allowed to request.
    pub allowed_scopes: Vec<String>,

    /// Scopes granted when a request carries no `scope` parameter.
    #[serde(default)]
    pub default_scopes: Vec<String>,

    /// Access token lifetime in seconds.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub access_token_lifetime: Option<i64>,

    /// Refresh token lifetime in seconds.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub refresh_token_lifetime: Option<i64>,

    /// ID token lifetime in seconds.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub id_token_lifetime: Option<i64>,

    /// Whether PKCE is required for the authorization code flow.
    /// Public clients require PKCE regardless of this flag.
    pub require_pkce: bool,

    /// Whether the user must consent before authorization succeeds.
    pub require_consent: bool,

    /// First-party clients skip the consent check even when
    /// `require_consent` is set.
    pub first_party: bool,

    /// Operator who registered the client.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub owner_id: Option<Uuid>,

    /// Whether this client is currently active and can be used.
    pub is_active: bool,

    /// When the client was registered.
    #[serde(with = "time::serde::rfc3339")]
    pub created_at: OffsetDateTime,

    /// When the client was last updated.
    #[serde(with = "time::serde::rfc3339")]
    pub updated_at: OffsetDateTime,
}

impl Client {
    /// Validates the client configuration.
    ///
    /// # Errors
    ///
    /// Returns an error if the client configuration is invalid.
    pub fn validate(&self) -> Result<(), ClientValidationError> {
        if self.client_id.is_empty() {
            return Err(ClientValidationError::EmptyClientId);
        }

        if self.name.is_empty() {
            return Err(ClientValidationError::EmptyName);
        }

        if self.allowed_grant_types.is_empty() {
            return Err(ClientValidationError::NoGrantTypes);
        }

        if self.allowed_scopes.is_empty() {
            return Err(ClientValidationError::NoScopes);
        }

        match self.client_type {
            ClientType::Confidential => {
                if self.client_secret_hash.is_none() {
                    return Err(ClientValidationError::MissingSecret);
                }
            }
            ClientType::Public => {
                if self.client_secret_hash.is_some() {
                    return Err(ClientValidationError::PublicClientWithSecret);
                }
                if self
                    .allowed_grant_types
                    .contains(&GrantType::ClientCredentials)
                {
                    return Err(ClientValidationError::PublicClientCredentials);
                }
            }
        }

        if self
            .allowed_grant_types
            .contains(&GrantType::AuthorizationCode)
            && self.redirect_uris.is_empty()
        {
            return Err(ClientValidationError::NoRedirectUris);
        }

        Ok(())
    }

    /// Returns `true` for confidential clients.
    #[must_use]
    pub fn is_confidential(&self) -> bool {
        self.client_type == ClientType::Confidential
    }

    /// Checks if the given redirect URI is registered. Exact match only.
    #[must_use]
    pub fn is_redirect_uri_allowed(&self, uri: &str) -> bool {
        self.redirect_uris.iter().any(|allowed| allowed == uri)
    }

    /// Checks if every requested scope is in the allowed set.
    #[must_use]
    pub fn scopes_allowed(&self, requested: &[&str]) -> bool {
        requested
            .iter()
            .all(|scope| self.allowed_scopes.iter().any(|allowed| allowed == scope))
    }

    /// Checks if the given grant type is allowed for this client.
    #[must_use]
    pub fn is_grant_type_allowed(&self, grant_type: GrantType) -> bool {
        self.allowed_grant_types.contains(&grant_type)
    }

    /// Returns whether PKCE is required for this client.
    ///
    /// Public clients always require PKCE; confidential clients may opt in.
    #[must_use]
    pub fn requires_pkce(&self) -> bool {
        self.client_type == ClientType::Public || self.require_pkce
    }

    /// Returns whether authorization must pass the consent check.
    #[must_use]
    pub fn needs_consent(&self) -> bool {
        self.require_consent && !self.first_party
    }

    /// Access token lifetime in seconds. Defaults to 900 (15 minutes).
    #[must_use]
    pub fn access_token_lifetime_secs(&self) -> i64 {
        self.access_token_lifetime.unwrap_or(900)
    }

    /// Refresh token lifetime in seconds. Defaults to 604800 (7 days).
    #[must_use]
    pub fn refresh_token_lifetime_secs(&self) -> i64 {
        self.refresh_token_lifetime.unwrap_or(604_800)
    }

    /// ID token lifetime in seconds. Defaults to 3600 (1 hour).
    #[must_use]
    pub fn id_token_lifetime_secs(&self) -> i64 {
        self.id_token_lifetime.unwrap_or(3600)
    }
}

/// Errors from client configuration validation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
pub enum ClientValidationError {
    /// The client_id is empty.
    #[error("client_id must not be empty")]
    EmptyClientId,

    /// The display name is empty.
    #[error("name must not be empty")]
    EmptyName,

    /// No grant types configured.
    #[error("at least one grant type is required")]
    NoGrantTypes,

    /// No allowed scopes configured.
    #[error("at least one allowed scope is required")]
    NoScopes,

    /// A confidential client has no secret hash.
    #[error("confidential client must have a client secret")]
    MissingSecret,

    /// A public client carries a secret hash.
    #[error("public client must not have a client secret")]
    PublicClientWithSecret,

    /// A public client allows the client_credentials grant.
    #[error("public client cannot use client_credentials grant")]
    PublicClientCredentials,

    /// The authorization_code grant is allowed but no redirect URIs are
    /// registered.
    #[error("authorization_code grant requires at least one redirect URI")]
    NoRedirectUris,
}

// =============================================================================
// Registry request/response types
// =============================================================================

/// Request to register a new OAuth client.
#[derive(Debug, Clone, Deserialize)]
pub struct CreateClientRequest {
    /// Display name.
    pub name: String,
    /// Description.
    #[serde(default)]
    pub description: Option<String>,
    /// Logo URL.
    #[serde(default)]
    pub logo_url: Option<String>,
    /// Public or confidential.
    pub client_type: ClientType,
    /// Redirect URIs (required for authorization_code).
    #[serde(default)]
    pub redirect_uris: Vec<String>,
    /// Allowed grant types.
    pub allowed_grant_types: Vec<GrantType>,
    /// Allowed scopes.
    pub allowed_scopes: Vec<String>,
    /// Default scopes.
    #[serde(default)]
    pub default_scopes: Vec<String>,
    /// Access token lifetime override in seconds.
    #[serde(default)]
    pub access_token_lifetime: Option<i64>,
    /// Refresh token lifetime override in seconds.
    #[serde(default)]
    pub refresh_token_lifetime: Option<i64>,
    /// ID token lifetime override in seconds.
    #[serde(default)]
    pub id_token_lifetime: Option<i64>,
    /// Require PKCE. Defaults to true for public clients.
    #[serde(default)]
    pub require_pkce: Option<bool>,
    /// Require consent. Defaults to true.
    #[serde(default)]
    pub require_consent: Option<bool>,
    /// First-party flag. Defaults to false.
    #[serde(default)]
    pub first_party: Option<bool>,
    /// Operator registering the client.
    #[serde(default)]
    pub owner_id: Option<Uuid>,
}

/// Response returned when a client is registered.
///
/// `client_secret` is present only for confidential clients, and only here:
/// the plaintext secret is never stored and cannot be recovered later.
#[derive(Debug, Clone, Serialize)]
pub struct CreateClientResponse {
    /// The registered client.
    pub client: Client,
    /// Plaintext client secret, returned exactly once.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub client_secret: Option<String>,
}

/// Partial, non-destructive client update. `None` fields are left unchanged.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct UpdateClientRequest {
    /// New display name.
    #[serde(default)]
    pub name: Option<String>,
    /// New description.
    #[serde(default)]
    pub description: Option<String>,
    /// New logo URL.
    #[serde(default)]
    pub logo_url: Option<String>,
    /// Replacement redirect URI set.
    #[serde(default)]
    pub redirect_uris: Option<Vec<String>>,
    /// Replacement grant type set.
    #[serde(default)]
    pub allowed_grant_types: Option<Vec<GrantType>>,
    /// Replacement allowed scope set.
    #[serde(default)]
    pub allowed_scopes: Option<Vec<String>>,
    /// Replacement default scope set.
    #[serde(default)]
    pub default_scopes: Option<Vec<String>>,
    /// New access token lifetime in seconds.
    #[serde(default)]
    pub access_token_lifetime: Option<i64>,
    /// New refresh token lifetime in seconds.
    #[serde(default)]
    pub refresh_token_lifetime: Option<i64>,
    /// New ID token lifetime in seconds.
    #[serde(default)]
    pub id_token_lifetime: Option<i64>,
    /// New PKCE requirement.
    #[serde(default)]
    pub require_pkce: Option<bool>,
    /// New consent requirement.
    #[serde(default)]
    pub require_consent: Option<bool>,
    /// Activate or deactivate the client.
    #[serde(default)]
    pub is_active: Option<bool>,
}
