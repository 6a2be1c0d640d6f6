//! OAuth 2.0 authorization server core.
//!
//! This module provides:
//!
//! - Authorization endpoint types and validation ([`authorize`], [`service`])
//! - Token endpoint types ([`token`])
//! - Device authorization endpoint types ([`device`])
//! - PKCE challenge/verifier implementation ([`pkce`])
//!
//! # Authorization Code Flow
//!
//! ```ignore
//! use authgate_provider::oauth::{
//!     AuthorizationService, AuthorizationRequest, AuthorizationResponse,
//!     PkceVerifier, PkceChallenge, PkceChallengeMethod,
//! };
//!
//! // Client generates PKCE verifier and challenge
//! let verifier = PkceVerifier::generate();
//! let challenge = PkceChallenge::from_verifier(&verifier, PkceChallengeMethod::S256);
//!
//! // Server processes the authorization request for an authenticated user
//! let issued = service.authorize(&request, user_id).await?;
//!
//! // Build redirect response
//! let response = AuthorizationResponse::new(issued.code, request.state);
//! let redirect_url = response.to_redirect_url(&request.redirect_uri)?;
//! ```

pub mod authorize;
pub mod device;
pub mod pkce;
pub mod service;
pub mod token;

// Authorization endpoint types
pub use authorize::{
    AuthorizationError, AuthorizationErrorCode, AuthorizationRequest, AuthorizationResponse,
};

// Device authorization endpoint types
pub use device::{DeviceAuthorizationRequest, DeviceAuthorizationResponse};

// PKCE types
pub use pkce::{PkceChallenge, PkceChallengeMethod, PkceError, PkceVerifier};

// Service types
pub use service::{AuthorizationService, IssuedCode};

// Token endpoint types
pub use token::{TokenError, TokenErrorCode, TokenRequest, TokenResponse};
