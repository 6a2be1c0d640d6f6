//! Token issuance, validation, introspection, and revocation.
//!
//! [`TokenService`] sits behind the token endpoint and handles every grant,
//! plus RFC 7662 introspection and RFC 7009 revocation. [`JwtService`] signs
//! and validates JWTs when a signing key is configured; without one the
//! provider issues opaque tokens validated against the store.

pub mod introspection;
pub mod jwt;
pub mod revocation;
pub mod service;

pub use introspection::{IntrospectionRequest, IntrospectionResponse};
pub use jwt::{
    AccessTokenClaims, IdTokenClaims, Jwk, Jwks, JwtError, JwtService, SigningAlgorithm,
    SigningKeyPair,
};
pub use revocation::{RevocationRequest, TokenTypeHint};
pub use service::TokenService;
