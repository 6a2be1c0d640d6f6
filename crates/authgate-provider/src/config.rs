//! Provider configuration.
//!
//! Configuration for the authorization server engine: issuer identity,
//! grant/token lifetimes, device-flow pacing, and token signing.
//!
//! # Example (TOML)
//!
//! ```toml
//! [provider]
//! issuer = "https://auth.example.com"
//! base_url = "https://auth.example.com"
//!
//! [provider.oauth]
//! authorization_code_lifetime = "10m"
//! access_token_lifetime = "15m"
//! refresh_token_lifetime = "7d"
//! ```

use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Root provider configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct ProviderConfig {
    /// Issuer URL (used in token `iss` claim and the discovery document).
    pub issuer: String,

    /// Public base URL of the server, used to build endpoint and device
    /// verification URLs. Usually identical to `issuer`.
    pub base_url: String,

    /// OAuth 2.0 grant and token settings.
    pub oauth: OAuthConfig,

    /// Token signing settings.
    pub signing: SigningConfig,
}

impl Default for ProviderConfig {
    fn default() -> Self {
        Self {
            issuer: "http://localhost:8080".to_string(),
            base_url: "http://localhost:8080".to_string(),
            oauth: OAuthConfig::default(),
            signing: SigningConfig::default(),
        }
    }
}

impl ProviderConfig {
    /// Creates a configuration with the given issuer, which is also used as
    /// the base URL.
    #[must_use]
    pub fn new(issuer: impl Into<String>) -> Self {
        let issuer = issuer.into();
        Self {
            base_url: issuer.clone(),
            issuer,
            ..Self::default()
        }
    }

    /// Overrides the public base URL.
    #[must_use]
    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into();
        self
    }

    /// Overrides the OAuth settings.
    #[must_use]
    pub fn with_oauth(mut self, oauth: OAuthConfig) -> Self {
        self.oauth = oauth;
        self
    }
}

/// OAuth 2.0 grant and token configuration.
///
/// Per-client TTLs on the client record take precedence over the defaults
/// here; these values apply when a client does not override them.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct OAuthConfig {
    /// Authorization code lifetime. Codes are single-use and short-lived.
    #[serde(with = "humantime_serde")]
    pub authorization_code_lifetime: Duration,

    /// Device code lifetime (RFC 8628).
    #[serde(with = "humantime_serde")]
    pub device_code_lifetime: Duration,

    /// Recommended device-flow polling interval, advertised to clients.
    #[serde(with = "humantime_serde")]
    pub device_poll_interval: Duration,

    /// Reject device-flow polls that arrive faster than the advertised
    /// interval with `slow_down`.
    pub enforce_poll_interval: bool,

    /// Default access token lifetime.
    #[serde(with = "humantime_serde")]
    pub access_token_lifetime: Duration,

    /// Default refresh token lifetime.
    #[serde(with = "humantime_serde")]
    pub refresh_token_lifetime: Duration,

    /// Default ID token lifetime.
    #[serde(with = "humantime_serde")]
    pub id_token_lifetime: Duration,

    /// Rotate refresh tokens on use. The presented token is revoked before
    /// its successor is issued.
    pub refresh_token_rotation: bool,
}

impl Default for OAuthConfig {
    fn default() -> Self {
        Self {
            authorization_code_lifetime: Duration::from_secs(600), // 10 minutes
            device_code_lifetime: Duration::from_secs(900),        // 15 minutes
            device_poll_interval: Duration::from_secs(5),
            enforce_poll_interval: true,
            access_token_lifetime: Duration::from_secs(900), // 15 minutes
            refresh_token_lifetime: Duration::from_secs(604_800), // 7 days
            id_token_lifetime: Duration::from_secs(3600),    // 1 hour
            refresh_token_rotation: true,
        }
    }
}

impl OAuthConfig {
    /// Sets the authorization code lifetime.
    #[must_use]
    pub fn with_authorization_code_lifetime(mut self, lifetime: Duration) -> Self {
        self.authorization_code_lifetime = lifetime;
        self
    }

    /// Sets the device code lifetime.
    #[must_use]
    pub fn with_device_code_lifetime(mut self, lifetime: Duration) -> Self {
        self.device_code_lifetime = lifetime;
        self
    }

    /// Sets the device polling interval.
    #[must_use]
    pub fn with_device_poll_interval(mut self, interval: Duration) -> Self {
        self.device_poll_interval = interval;
        self
    }

    /// Enables or disables `slow_down` enforcement.
    #[must_use]
    pub fn with_enforce_poll_interval(mut self, enforce: bool) -> Self {
        self.enforce_poll_interval = enforce;
        self
    }

    /// Enables or disables refresh token rotation.
    #[must_use]
    pub fn with_refresh_token_rotation(mut self, rotate: bool) -> Self {
        self.refresh_token_rotation = rotate;
        self
    }
}

/// Token signing configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct SigningConfig {
    /// Signing algorithm. Supported: "RS256", "RS384", "ES384".
    pub algorithm: String,

    /// Key rotation period in days.
    pub key_rotation_days: u32,

    /// Number of retired keys kept in the JWKS so tokens signed with them
    /// validate until expiry.
    pub keys_to_keep: u32,
}

impl Default for SigningConfig {
    fn default() -> Self {
        Self {
            algorithm: "RS256".to_string(),
            key_rotation_days: 90,
            keys_to_keep: 3,
        }
    }
}
