//! User consent records.

use serde::{Deserialize, Serialize};
use time::OffsetDateTime;
use uuid::Uuid;

/// A user's consent for a client to receive a scope set.
///
/// An authorization that needs consent proceeds only when an unrevoked
/// record exists whose scope set is a superset of the requested scopes.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UserConsent {
    /// Internal record identifier.
    pub id: Uuid,

    /// The consenting user.
    pub user_id: String,

    /// The client consented to.
    pub client_id: String,

    /// Granted scopes.
    pub scopes: Vec<String>,

    /// When consent was granted or last updated.
    #[serde(with = "time::serde::rfc3339")]
    pub granted_at: OffsetDateTime,

    /// Revocation marker; a revoked consent never satisfies a consent check.
    #[serde(skip_serializing_if = "Option::is_none")]
    #[serde(with = "time::serde::rfc3339::option")]
    #[serde(default)]
    pub revoked_at: Option<OffsetDateTime>,
}

impl UserConsent {
    /// Returns `true` if the consent has been revoked.
    #[must_use]
    pub fn is_revoked(&self) -> bool {
        self.revoked_at.is_some()
    }

    /// Returns `true` if the granted scope set covers every requested scope.
    #[must_use]
    pub fn covers_scopes(&self, requested: &[&str]) -> bool {
        requested
            .iter()
            .all(|scope| self.scopes.iter().any(|granted| granted == scope))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn consent(scopes: &[&str]) -> UserConsent {
        UserConsent {
            id: Uuid::new_v4(),
            user_id: "user-1".to_string(),
            client_id: "agw_test".to_string(),
            scopes: scopes.iter().map(|s| (*s).to_string()).collect(),
            granted_at: OffsetDateTime::now_utc(),
            revoked_at: None,
        }
    }

    #[test]
    fn test_covers_scopes_superset() {
        let consent = consent(&["openid", "profile", "email"]);
        assert!(consent.covers_scopes(&["openid"]));
        assert!(consent.covers_scopes(&["openid", "email"]));
        assert!(!consent.covers_scopes(&["openid", "phone"]));
        assert!(consent.covers_scopes(&[]));
    }

    #[test]
    fn test_revocation_marker() {
        let mut consent = consent(&["openid"]);
        assert!(!consent.is_revoked());
        consent.revoked_at = Some(OffsetDateTime::now_utc());
        assert!(consent.is_revoked());
    }
}
