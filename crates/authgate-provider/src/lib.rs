//! # authgate-provider
//!
//! OAuth 2.0 / OpenID Connect authorization server engine.
//!
//! This crate provides:
//! - Authorization code flow with PKCE (RFC 7636)
//! - Client credentials, refresh token, and device code (RFC 8628) grants
//! - Token introspection (RFC 7662) and revocation (RFC 7009)
//! - OIDC discovery, JWKS publication, and userinfo
//! - Client registration with Argon2id secret hashing
//! - User consent management
//! - Audit logging for security events
//!
//! ## Overview
//!
//! The engine is storage-agnostic: every persistence concern sits behind an
//! async trait in [`storage`], and backends live in separate crates
//! (`authgate-provider-memory` ships an in-memory one). Codes and tokens are
//! stored as SHA-256 digests; plaintext values leave the engine exactly once,
//! in the response that delivers them to the client.
//!
//! Without a configured signing key the provider issues opaque access tokens
//! validated against the store; with one, access and ID tokens are signed
//! JWTs published through JWKS.
//!
//! ## Modules
//!
//! - [`config`] - Provider configuration (issuer, lifetimes, signing)
//! - [`client`] - Client registration and authentication
//! - [`oauth`] - Authorization endpoint, PKCE, and wire types
//! - [`token`] - Token issuance, introspection, and revocation
//! - [`device`] - Device authorization flow
//! - [`consent`] - User consent management
//! - [`oidc`] - Discovery document and userinfo types
//! - [`scope`] - Scope descriptor management
//! - [`audit`] - Security event audit logging
//! - [`storage`] - Storage traits for provider data

pub mod audit;
pub mod client;
pub mod config;
pub mod consent;
pub mod device;
pub mod error;
pub mod oauth;
pub mod oidc;
pub mod scope;
pub mod secret;
pub mod storage;
pub mod token;
pub mod types;

pub use audit::{AuditEvent, AuditEventKind, AuditSink, TracingAuditSink};
pub use client::ClientService;
pub use config::{OAuthConfig, ProviderConfig, SigningConfig};
pub use consent::ConsentService;
pub use device::DeviceService;
pub use error::{AuthError, ErrorCategory};
pub use oauth::{
    AuthorizationRequest, AuthorizationResponse, AuthorizationService, DeviceAuthorizationRequest,
    DeviceAuthorizationResponse, IssuedCode, PkceChallenge, PkceChallengeMethod, PkceVerifier,
    TokenRequest, TokenResponse,
};
pub use oidc::{DiscoveryDocument, UserInfoResponse};
pub use scope::ScopeService;
pub use storage::{
    AccessTokenStorage, AuthorizationCodeStorage, ClientStorage, ConsentStorage, DeviceCodeStorage,
    RefreshTokenStorage, ScopeStorage, SessionBinding, SessionBridge, UserStorage,
};
pub use token::{
    IntrospectionRequest, IntrospectionResponse, JwtService, RevocationRequest, SigningAlgorithm,
    SigningKeyPair, TokenService, TokenTypeHint,
};
pub use types::{
    AccessTokenRecord, AuthorizationCode, Client, ClientType, ClientValidationError,
    CreateClientRequest, CreateClientResponse, DeviceCodeRecord, DeviceCodeStatus, GrantType,
    RefreshTokenRecord, UpdateClientRequest, User, UserConsent,
};

/// Type alias for authorization server results.
pub type AuthResult<T> = Result<T, AuthError>;

/// Prelude module for convenient imports.
///
/// ```ignore
/// use authgate_provider::prelude::*;
/// ```
pub mod prelude {
    pub use crate::AuthResult;
    pub use crate::audit::{AuditEvent, AuditEventKind, AuditSink, TracingAuditSink};
    pub use crate::client::ClientService;
    pub use crate::config::{OAuthConfig, ProviderConfig, SigningConfig};
    pub use crate::consent::ConsentService;
    pub use crate::device::DeviceService;
    pub use crate::error::{AuthError, ErrorCategory};
    pub use crate::oauth::{
        AuthorizationRequest, AuthorizationResponse, AuthorizationService,
        DeviceAuthorizationRequest, DeviceAuthorizationResponse, PkceChallenge,
        PkceChallengeMethod, PkceVerifier, TokenRequest, TokenResponse,
    };
    pub use crate::oidc::{DiscoveryDocument, UserInfoResponse};
    pub use crate::scope::ScopeService;
    pub use crate::storage::{
        AccessTokenStorage, AuthorizationCodeStorage, ClientStorage, ConsentStorage,
        DeviceCodeStorage, RefreshTokenStorage, ScopeStorage, SessionBinding, SessionBridge,
        UserStorage,
    };
    pub use crate::token::{
        IntrospectionRequest, IntrospectionResponse, JwtService, RevocationRequest,
        SigningAlgorithm, SigningKeyPair, TokenService, TokenTypeHint,
    };
    pub use crate::types::{
        Client, ClientType, CreateClientRequest, CreateClientResponse, GrantType, User,
        UserConsent,
    };
}
