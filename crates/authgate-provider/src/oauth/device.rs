//! Device authorization endpoint types (RFC 8628).
//!
//! The device authorization endpoint starts the device flow: the device
//! receives a long device code and a short user code, displays the user code
//! and verification URI, and polls the token endpoint with the device code
//! until the user approves or denies the request in a browser.

use serde::{Deserialize, Serialize};

/// Device authorization request parameters.
///
/// # Example
///
/// ```ignore
/// POST /oauth/device/code
/// Content-Type: application/x-www-form-urlencoded
///
/// client_id=agw_h1WUMvCVQupLkB4z&scope=openid%20profile
/// ```
#[derive(Debug, Clone, Deserialize)]
pub struct DeviceAuthorizationRequest {
    /// Client identifier.
    pub client_id: String,

    /// Requested scopes (space-separated). Falls back to the client's
    /// default scopes when omitted.
    #[serde(default)]
    pub scope: Option<String>,
}

/// Device authorization response (RFC 8628 Section 3.2).
///
/// # Example Response
///
/// ```json
/// {
///   "device_code": "GmRhmhcxhwAzkoEqiMEg_DnyEysNkuNhszIySk9eS",
///   "user_code": "WDJB-MJHT",
///   "verification_uri": "https://auth.example.com/device",
///   "verification_uri_complete": "https://auth.example.com/device?user_code=WDJB-MJHT",
///   "expires_in": 900,
///   "interval": 5
/// }
/// ```
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DeviceAuthorizationResponse {
    /// Long opaque code the device polls the token endpoint with.
    /// Returned in plaintext exactly once; stored hashed.
    pub device_code: String,

    /// Short code the user types at the verification URI.
    pub user_code: String,

    /// URL the user visits to enter the code.
    pub verification_uri: String,

    /// Verification URL with the user code pre-filled.
    pub verification_uri_complete: String,

    /// Lifetime of the device code in seconds.
    pub expires_in: u64,

    /// Minimum seconds the device should wait between token endpoint polls.
    pub interval: u64,
}
