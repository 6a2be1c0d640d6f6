//! Scope descriptors.
//!
//! Purely descriptive metadata for consent-screen rendering and discovery.
//! Grant handlers check scopes against the client's allowed set, not against
//! this table.

use serde::{Deserialize, Serialize};
use time::OffsetDateTime;
use uuid::Uuid;

/// Standard OIDC scopes advertised in the discovery document.
pub const OIDC_SCOPES: &[&str] = &[
    "openid",
    "profile",
    "email",
    "phone",
    "address",
    "offline_access",
];

/// A named scope with display metadata.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ScopeDescriptor {
    /// Internal record identifier.
    pub id: Uuid,

    /// Scope name as used in requests (e.g. "profile", "api:read").
    pub name: String,

    /// Human-readable name for the consent screen.
    pub display_name: String,

    /// Longer description for the consent screen.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,

    /// Granted by default when a client omits the scope parameter.
    pub is_default: bool,

    /// Built-in scope; cannot be deleted.
    pub is_system: bool,

    /// When the scope was defined.
    #[serde(with = "time::serde::rfc3339")]
    pub created_at: OffsetDateTime,
}

impl ScopeDescriptor {
    /// Creates a non-system scope descriptor.
    #[must_use]
    pub fn new(name: impl Into<String>, display_name: impl Into<String>) -> Self {
        Self {
            id: Uuid::new_v4(),
            name: name.into(),
            display_name: display_name.into(),
            description: None,
            is_default: false,
            is_system: false,
            created_at: OffsetDateTime::now_utc(),
        }
    }

    /// Sets the description.
    #[must_use]
    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_standard_scopes() {
        assert!(OIDC_SCOPES.contains(&"openid"));
        assert!(OIDC_SCOPES.contains(&"offline_access"));
        assert_eq!(OIDC_SCOPES.len(), 6);
    }

    #[test]
    fn test_descriptor_builder() {
        let scope = ScopeDescriptor::new("api:read", "Read API access")
            .with_description("Read-only access to the API");
        assert_eq!(scope.name, "api:read");
        assert!(!scope.is_system);
        assert!(scope.description.is_some());
    }
}
