//! Storage traits for authorization server data.
//!
//! This module defines storage interfaces for:
//!
//! - OAuth client registrations
//! - Authorization codes
//! - Access and refresh tokens
//! - Device codes
//! - User consents and scope descriptors
//! - The external user store and session bridge
//!
//! # Implementations
//!
//! Storage implementations live in separate crates:
//!
//! - `authgate-provider-memory` - in-memory backend for tests and embedding

pub mod client;
pub mod code;
pub mod consent;
pub mod device;
pub mod scope;
pub mod session;
pub mod token;
pub mod user;

pub use client::ClientStorage;
pub use code::AuthorizationCodeStorage;
pub use consent::ConsentStorage;
pub use device::DeviceCodeStorage;
pub use scope::ScopeStorage;
pub use session::{SessionBinding, SessionBridge};
pub use token::{AccessTokenStorage, RefreshTokenStorage};
pub use user::UserStorage;
