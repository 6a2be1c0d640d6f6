//! # authgate-provider-memory
//!
//! In-memory storage backend for the Authgate provider engine.
//!
//! Implements every storage trait from `authgate_provider::storage` over
//! `tokio::sync::RwLock`-guarded maps. The atomic operations the traits
//! require (code consumption, refresh rotation, device code transitions)
//! run their check and mutation under a single write guard.
//!
//! Intended for tests and single-process embeddings; nothing survives a
//! restart.
//!
//! ## Usage
//!
//! ```ignore
//! use std::sync::Arc;
//! use authgate_provider::client::ClientService;
//! use authgate_provider_memory::InMemoryClientStorage;
//!
//! let clients = ClientService::new(Arc::new(InMemoryClientStorage::new()));
//! ```

mod client;
mod code;
mod consent;
mod device;
mod scope;
mod session;
mod token;
mod user;

pub use client::InMemoryClientStorage;
pub use code::InMemoryAuthorizationCodeStorage;
pub use consent::InMemoryConsentStorage;
pub use device::InMemoryDeviceCodeStorage;
pub use scope::InMemoryScopeStorage;
pub use session::InMemorySessionBridge;
pub use token::{InMemoryAccessTokenStorage, InMemoryRefreshTokenStorage};
pub use user::InMemoryUserStorage;
