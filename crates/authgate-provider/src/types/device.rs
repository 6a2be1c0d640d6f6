//! Device authorization grant records (RFC 8628).
//!
//! Pairs a long machine-readable device code (hashed at rest) with a short
//! human-readable user code. The status is a small state machine:
//! `pending -> authorized` or `pending -> denied`, both terminal. Expiry is
//! a time predicate applied on top of the status, not a status of its own.

use rand::Rng;
use serde::{Deserialize, Serialize};
use time::OffsetDateTime;
use uuid::Uuid;

/// Character set for user codes: uppercase letters and digits minus the
/// easily-confused I, O, 0 and 1.
const USER_CODE_CHARSET: &[u8] = b"ABCDEFGHJKLMNPQRSTUVWXYZ23456789";

/// Generates a user code in `XXXX-XXXX` form.
#[must_use]
pub fn generate_user_code() -> String {
    let mut rng = rand::thread_rng();
    let mut code = String::with_capacity(9);
    for i in 0..8 {
        if i == 4 {
            code.push('-');
        }
        let idx = rng.gen_range(0..USER_CODE_CHARSET.len());
        code.push(USER_CODE_CHARSET[idx] as char);
    }
    code
}

/// Status of a device code.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DeviceCodeStatus {
    /// Waiting for the user to approve or deny.
    Pending,
    /// Approved by the user; the next poll mints tokens.
    Authorized,
    /// Denied by the user.
    Denied,
}

impl DeviceCodeStatus {
    /// Returns the status as a string.
    #[must_use]
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Pending => "pending",
            Self::Authorized => "authorized",
            Self::Denied => "denied",
        }
    }

    /// Returns `true` for terminal states (no further transitions).
    #[must_use]
    pub fn is_terminal(&self) -> bool {
        matches!(self, Self::Authorized | Self::Denied)
    }
}

impl std::fmt::Display for DeviceCodeStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Stored device authorization, indexed by device code hash and user code.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DeviceCodeRecord {
    /// Internal record identifier.
    pub id: Uuid,

    /// SHA-256 hex digest of the device code. Never the plaintext.
    #[serde(skip)]
    pub device_code_hash: String,

    /// Short human-readable code the user types in.
    pub user_code: String,

    /// Client the authorization was requested by.
    pub client_id: String,

    /// User who approved the code. Stamped on approval.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub user_id: Option<String>,

    /// Requested scope, space-separated.
    pub scope: String,

    /// Current state.
    pub status: DeviceCodeStatus,

    /// URL the user visits to enter the code.
    pub verification_uri: String,

    /// Verification URL with the user code pre-filled.
    pub verification_uri_complete: String,

    /// Expiry instant.
    #[serde(with = "time::serde::rfc3339")]
    pub expires_at: OffsetDateTime,

    /// Recommended polling interval in seconds.
    pub interval: u64,

    /// When the device last polled the token endpoint. Used for `slow_down`.
    #[serde(skip_serializing_if = "Option::is_none")]
    #[serde(with = "time::serde::rfc3339::option")]
    #[serde(default)]
    pub last_polled_at: Option<OffsetDateTime>,

    /// Issuance instant.
    #[serde(with = "time::serde::rfc3339")]
    pub created_at: OffsetDateTime,
}

impl DeviceCodeRecord {
    /// Returns `true` if the device code is past its expiry.
    #[must_use]
    pub fn is_expired(&self) -> bool {
        OffsetDateTime::now_utc() >= self.expires_at
    }

    /// Returns `true` while the code awaits a user decision.
    #[must_use]
    pub fn is_pending(&self) -> bool {
        self.status == DeviceCodeStatus::Pending
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::token::{generate_token, hash_token};
    use time::Duration;

    #[test]
    fn test_user_code_format() {
        for _ in 0..50 {
            let code = generate_user_code();
            assert_eq!(code.len(), 9);
            assert_eq!(&code[4..5], "-");
            for c in code.chars().filter(|c| *c != '-') {
                assert!(
                    USER_CODE_CHARSET.contains(&(c as u8)),
                    "unexpected character {c} in user code"
                );
            }
            // Confusable characters are excluded
            assert!(!code.contains('I'));
            assert!(!code.contains('O'));
            assert!(!code.contains('0'));
            assert!(!code.contains('1'));
        }
    }

    #[test]
    fn test_status_transitions_terminal() {
        assert!(!DeviceCodeStatus::Pending.is_terminal());
        assert!(DeviceCodeStatus::Authorized.is_terminal());
        assert!(DeviceCodeStatus::Denied.is_terminal());
    }

    #[test]
    fn test_status_serde() {
        assert_eq!(
            serde_json::to_string(&DeviceCodeStatus::Pending).unwrap(),
            r#""pending""#
        );
        let status: DeviceCodeStatus = serde_json::from_str(r#""authorized""#).unwrap();
        assert_eq!(status, DeviceCodeStatus::Authorized);
    }

    #[test]
    fn test_expiry_is_time_predicate() {
        let now = OffsetDateTime::now_utc();
        let record = DeviceCodeRecord {
            id: Uuid::new_v4(),
            device_code_hash: hash_token(&generate_token()),
            user_code: generate_user_code(),
            client_id: "agw_test".to_string(),
            user_id: None,
            scope: "openid".to_string(),
            status: DeviceCodeStatus::Pending,
            verification_uri: "https://auth.example.com/device".to_string(),
            verification_uri_complete: "https://auth.example.com/device?user_code=WXYZ-2345"
                .to_string(),
            expires_at: now - Duration::seconds(1),
            interval: 5,
            last_polled_at: None,
            created_at: now - Duration::minutes(16),
        };
        // Expired but still pending: expiry does not rewrite the status
        assert!(record.is_expired());
        assert!(record.is_pending());
    }
}
