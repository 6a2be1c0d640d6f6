//! Domain types for the authorization server.
//!
//! Records that flow through the storage traits: clients, authorization
//! codes, token records, device codes, consents, scope descriptors, and the
//! external user view. Codes and tokens are represented by their SHA-256
//! digests; plaintext values exist only in the responses that carry them to
//! the client once.

pub mod client;
pub mod code;
pub mod consent;
pub mod device;
pub mod scope;
pub mod token;
pub mod user;

pub use client::{
    Client, ClientType, ClientValidationError, CreateClientRequest, CreateClientResponse,
    GrantType, UpdateClientRequest,
};
pub use code::AuthorizationCode;
pub use consent::UserConsent;
pub use device::{DeviceCodeRecord, DeviceCodeStatus, generate_user_code};
pub use scope::{OIDC_SCOPES, ScopeDescriptor};
pub use token::{AccessTokenRecord, RefreshTokenRecord, generate_token, hash_token};
pub use user::User;
