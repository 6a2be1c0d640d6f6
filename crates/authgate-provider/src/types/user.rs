//! External user view.
//!
//! The provider does not own user storage; it consumes this narrow view
//! through [`crate::storage::UserStorage`] for ID token claims, the
//! userinfo projection, and introspection usernames.

use serde::{Deserialize, Serialize};

/// The slice of a user record the authorization server needs.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct User {
    /// Stable subject identifier.
    pub id: String,

    /// Login/username, surfaced as `preferred_username`.
    pub username: String,

    /// Email address.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,

    /// Whether the email has been verified.
    #[serde(default)]
    pub email_verified: bool,

    /// Phone number.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub phone_number: Option<String>,

    /// Whether the phone number has been verified.
    #[serde(default)]
    pub phone_number_verified: bool,

    /// Display name.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,

    /// Avatar URL.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub picture: Option<String>,

    /// Role names carried into access token claims.
    #[serde(default)]
    pub roles: Vec<String>,

    /// Unix timestamp of the last profile update.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub updated_at: Option<i64>,
}
