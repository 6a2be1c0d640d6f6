//! Authorization server error types.
//!
//! This module defines every error the provider engine can surface. Protocol
//! errors map one-to-one onto the OAuth 2.0 error vocabulary via
//! [`AuthError::oauth_error_code`]; infrastructure errors collapse to
//! `server_error` so internal detail never leaks to clients.

use std::fmt;

/// Errors that can occur during authorization server operations.
#[derive(Debug, thiserror::Error)]
pub enum AuthError {
    /// The request is missing a required parameter or is otherwise malformed.
    #[error("Invalid request: {message}")]
    InvalidRequest {
        /// Description of why the request is invalid.
        message: String,
    },

    /// Client authentication failed or the client is not registered.
    ///
    /// Deliberately undifferentiated: unknown client, inactive client,
    /// missing secret, and secret mismatch all produce this same error to
    /// avoid a client-enumeration oracle.
    #[error("Invalid client: {message}")]
    InvalidClient {
        /// Description of why the client is invalid.
        message: String,
    },

    /// The authorization grant (code, refresh token, device code) is invalid,
    /// expired, revoked, already used, or was issued to another client.
    #[error("Invalid grant: {message}")]
    InvalidGrant {
        /// Description of why the grant is invalid.
        message: String,
    },

    /// The requested scope is invalid, unknown, or exceeds what the client
    /// is allowed to request.
    #[error("Invalid scope: {message}")]
    InvalidScope {
        /// Description of why the scope is invalid.
        message: String,
    },

    /// The authenticated client is not authorized to use this grant type.
    #[error("Unauthorized client: {message}")]
    UnauthorizedClient {
        /// Description of why the client is not authorized.
        message: String,
    },

    /// The resource owner denied the request.
    #[error("Access denied: {message}")]
    AccessDenied {
        /// Description of why access was denied.
        message: String,
    },

    /// The authorization server does not support the requested response type.
    #[error("Unsupported response type: {response_type}")]
    UnsupportedResponseType {
        /// The unsupported response type.
        response_type: String,
    },

    /// The authorization server does not support the requested grant type.
    #[error("Unsupported grant type: {grant_type}")]
    UnsupportedGrantType {
        /// The unsupported grant type.
        grant_type: String,
    },

    /// The user has not granted (or has revoked) consent for the requested
    /// scopes; the caller is expected to interpose the consent flow.
    #[error("Consent required: {message}")]
    ConsentRequired {
        /// Description of the missing consent.
        message: String,
    },

    /// No authenticated user is present; the caller is expected to interpose
    /// a login step.
    #[error("Login required: {message}")]
    LoginRequired {
        /// Description of the missing authentication.
        message: String,
    },

    /// Device flow: the user has not yet approved or denied the device code.
    #[error("Authorization pending")]
    AuthorizationPending,

    /// Device flow: the client is polling faster than the advertised interval.
    #[error("Slow down")]
    SlowDown,

    /// Device flow: the device code has expired.
    #[error("Expired token")]
    ExpiredToken,

    /// PKCE code verifier does not match the recorded code challenge.
    #[error("PKCE verification failed")]
    PkceVerificationFailed,

    /// The operation is not supported for this client type
    /// (e.g. secret rotation for a public client).
    #[error("Unsupported operation: {message}")]
    UnsupportedOperation {
        /// Description of the unsupported operation.
        message: String,
    },

    /// The provider was constructed without a token signer and the requested
    /// operation requires one.
    #[error("Signer unavailable: {message}")]
    SignerUnavailable {
        /// Description of the operation that needed the signer.
        message: String,
    },

    /// An error occurred while storing or retrieving provider data.
    #[error("Storage error: {message}")]
    Storage {
        /// Description of the storage error.
        message: String,
    },

    /// The provider configuration is invalid.
    #[error("Configuration error: {message}")]
    Configuration {
        /// Description of the configuration error.
        message: String,
    },

    /// An unexpected internal error occurred.
    #[error("Internal error: {message}")]
    Internal {
        /// Description of the internal error.
        message: String,
    },
}

impl AuthError {
    /// Creates a new `InvalidRequest` error.
    #[must_use]
    pub fn invalid_request(message: impl Into<String>) -> Self {
        Self::InvalidRequest {
            message: message.into(),
        }
    }

    /// Creates a new `InvalidClient` error.
    #[must_use]
    pub fn invalid_client(message: impl Into<String>) -> Self {
        Self::InvalidClient {
            message: message.into(),
        }
    }

    /// Creates a new `InvalidGrant` error.
    #[must_use]
    pub fn invalid_grant(message: impl Into<String>) -> Self {
        Self::InvalidGrant {
            message: message.into(),
        }
    }

    /// Creates a new `InvalidScope` error.
    #[must_use]
    pub fn invalid_scope(message: impl Into<String>) -> Self {
        Self::InvalidScope {
            message: message.into(),
        }
    }

    /// Creates a new `UnauthorizedClient` error.
    #[must_use]
    pub fn unauthorized_client(message: impl Into<String>) -> Self {
        Self::UnauthorizedClient {
            message: message.into(),
        }
    }

    /// Creates a new `AccessDenied` error.
    #[must_use]
    pub fn access_denied(message: impl Into<String>) -> Self {
        Self::AccessDenied {
            message: message.into(),
        }
    }

    /// Creates a new `UnsupportedResponseType` error.
    #[must_use]
    pub fn unsupported_response_type(response_type: impl Into<String>) -> Self {
        Self::UnsupportedResponseType {
            response_type: response_type.into(),
        }
    }

    /// Creates a new `UnsupportedGrantType` error.
    #[must_use]
    pub fn unsupported_grant_type(grant_type: impl Into<String>) -> Self {
        Self::UnsupportedGrantType {
            grant_type: grant_type.into(),
        }
    }

    /// Creates a new `ConsentRequired` error.
    #[must_use]
    pub fn consent_required(message: impl Into<String>) -> Self {
        Self::ConsentRequired {
            message: message.into(),
        }
    }

    /// Creates a new `LoginRequired` error.
    #[must_use]
    pub fn login_required(message: impl Into<String>) -> Self {
        Self::LoginRequired {
            message: message.into(),
        }
    }

    /// Creates a new `UnsupportedOperation` error.
    #[must_use]
    pub fn unsupported_operation(message: impl Into<String>) -> Self {
        Self::UnsupportedOperation {
            message: message.into(),
        }
    }

    /// Creates a new `SignerUnavailable` error.
    #[must_use]
    pub fn signer_unavailable(message: impl Into<String>) -> Self {
        Self::SignerUnavailable {
            message: message.into(),
        }
    }

    /// Creates a new `Storage` error.
    #[must_use]
    pub fn storage(message: impl Into<String>) -> Self {
        Self::Storage {
            message: message.into(),
        }
    }

    /// Creates a new `Configuration` error.
    #[must_use]
    pub fn configuration(message: impl Into<String>) -> Self {
        Self::Configuration {
            message: message.into(),
        }
    }

    /// Creates a new `Internal` error.
    #[must_use]
    pub fn internal(message: impl Into<String>) -> Self {
        Self::Internal {
            message: message.into(),
        }
    }

    /// Returns `true` if this is a client error (4xx category).
    #[must_use]
    pub fn is_client_error(&self) -> bool {
        !self.is_server_error()
    }

    /// Returns `true` if this is a server error (5xx category).
    #[must_use]
    pub fn is_server_error(&self) -> bool {
        matches!(
            self,
            Self::Storage { .. }
                | Self::Configuration { .. }
                | Self::Internal { .. }
                | Self::SignerUnavailable { .. }
        )
    }

    /// Returns `true` if the caller can resolve this error by interposing a
    /// login or consent step and retrying.
    #[must_use]
    pub fn is_interaction_required(&self) -> bool {
        matches!(
            self,
            Self::ConsentRequired { .. } | Self::LoginRequired { .. }
        )
    }

    /// Returns `true` if this is a device-flow polling outcome the client is
    /// expected to retry after.
    #[must_use]
    pub fn is_retryable_poll(&self) -> bool {
        matches!(self, Self::AuthorizationPending | Self::SlowDown)
    }

    /// Returns `true` if this error indicates a possible attack and should be
    /// flagged for audit (code reuse, PKCE mismatch, revoked-token use).
    #[must_use]
    pub fn is_security_anomaly(&self) -> bool {
        matches!(self, Self::PkceVerificationFailed)
    }

    /// Returns the error category for logging/monitoring purposes.
    #[must_use]
    pub fn category(&self) -> ErrorCategory {
        match self {
            Self::InvalidRequest { .. } => ErrorCategory::Validation,
            Self::InvalidClient { .. } => ErrorCategory::Authentication,
            Self::InvalidGrant { .. } => ErrorCategory::Authentication,
            Self::InvalidScope { .. } => ErrorCategory::Authorization,
            Self::UnauthorizedClient { .. } => ErrorCategory::Authorization,
            Self::AccessDenied { .. } => ErrorCategory::Authorization,
            Self::UnsupportedResponseType { .. } => ErrorCategory::Validation,
            Self::UnsupportedGrantType { .. } => ErrorCategory::Validation,
            Self::ConsentRequired { .. } => ErrorCategory::Interaction,
            Self::LoginRequired { .. } => ErrorCategory::Interaction,
            Self::AuthorizationPending => ErrorCategory::DeviceFlow,
            Self::SlowDown => ErrorCategory::DeviceFlow,
            Self::ExpiredToken => ErrorCategory::DeviceFlow,
            Self::PkceVerificationFailed => ErrorCategory::Authentication,
            Self::UnsupportedOperation { .. } => ErrorCategory::Validation,
            Self::SignerUnavailable { .. } => ErrorCategory::Configuration,
            Self::Storage { .. } => ErrorCategory::Infrastructure,
            Self::Configuration { .. } => ErrorCategory::Configuration,
            Self::Internal { .. } => ErrorCategory::Internal,
        }
    }

    /// Returns the OAuth 2.0 error code for this error.
    ///
    /// `authorization_pending`, `slow_down` and `expired_token` are the
    /// RFC 8628 device-flow codes; `consent_required` and `login_required`
    /// are the OIDC interaction codes used internally to signal the caller.
    #[must_use]
    pub fn oauth_error_code(&self) -> &'static str {
        match self {
            Self::InvalidRequest { .. } => "invalid_request",
            Self::InvalidClient { .. } => "invalid_client",
            Self::InvalidGrant { .. } => "invalid_grant",
            Self::InvalidScope { .. } => "invalid_scope",
            Self::UnauthorizedClient { .. } => "unauthorized_client",
            Self::AccessDenied { .. } => "access_denied",
            Self::UnsupportedResponseType { .. } => "unsupported_response_type",
            Self::UnsupportedGrantType { .. } => "unsupported_grant_type",
            Self::ConsentRequired { .. } => "consent_required",
            Self::LoginRequired { .. } => "login_required",
            Self::AuthorizationPending => "authorization_pending",
            Self::SlowDown => "slow_down",
            Self::ExpiredToken => "expired_token",
            Self::PkceVerificationFailed => "invalid_grant",
            Self::UnsupportedOperation { .. } => "invalid_request",
            Self::SignerUnavailable { .. } => "server_error",
            Self::Storage { .. } => "server_error",
            Self::Configuration { .. } => "server_error",
            Self::Internal { .. } => "server_error",
        }
    }
}

/// Categories of provider errors for logging and monitoring.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorCategory {
    /// Authentication-related errors (client/grant verification).
    Authentication,
    /// Authorization-related errors (scope and grant-type checks).
    Authorization,
    /// Request validation errors.
    Validation,
    /// User interaction required (login, consent).
    Interaction,
    /// Device-flow polling outcomes.
    DeviceFlow,
    /// Infrastructure/storage errors.
    Infrastructure,
    /// Configuration errors.
    Configuration,
    /// Internal server errors.
    Internal,
}

impl fmt::Display for ErrorCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Authentication => write!(f, "authentication"),
            Self::Authorization => write!(f, "authorization"),
            Self::Validation => write!(f, "validation"),
            Self::Interaction => write!(f, "interaction"),
            Self::DeviceFlow => write!(f, "device_flow"),
            Self::Infrastructure => write!(f, "infrastructure"),
            Self::Configuration => write!(f, "configuration"),
            Self::Internal => write!(f, "internal"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        let err = AuthError::invalid_client("client not found");
        assert_eq!(err.to_string(), "Invalid client: client not found");

        let err = AuthError::invalid_grant("authorization code already used");
        assert_eq!(
            err.to_string(),
            "Invalid grant: authorization code already used"
        );

        let err = AuthError::AuthorizationPending;
        assert_eq!(err.to_string(), "Authorization pending");

        let err = AuthError::consent_required("scopes not covered by consent");
        assert_eq!(
            err.to_string(),
            "Consent required: scopes not covered by consent"
        );
    }

    #[test]
    fn test_error_predicates() {
        let err = AuthError::invalid_client("test");
        assert!(err.is_client_error());
        assert!(!err.is_server_error());

        let err = AuthError::storage("database down");
        assert!(!err.is_client_error());
        assert!(err.is_server_error());

        let err = AuthError::signer_unavailable("token minting");
        assert!(err.is_server_error());

        assert!(AuthError::consent_required("x").is_interaction_required());
        assert!(AuthError::login_required("x").is_interaction_required());
        assert!(!AuthError::invalid_grant("x").is_interaction_required());

        assert!(AuthError::AuthorizationPending.is_retryable_poll());
        assert!(AuthError::SlowDown.is_retryable_poll());
        assert!(!AuthError::ExpiredToken.is_retryable_poll());

        assert!(AuthError::PkceVerificationFailed.is_security_anomaly());
    }

    #[test]
    fn test_error_category() {
        assert_eq!(
            AuthError::invalid_client("test").category(),
            ErrorCategory::Authentication
        );
        assert_eq!(
            AuthError::invalid_scope("test").category(),
            ErrorCategory::Authorization
        );
        assert_eq!(
            AuthError::consent_required("test").category(),
            ErrorCategory::Interaction
        );
        assert_eq!(
            AuthError::AuthorizationPending.category(),
            ErrorCategory::DeviceFlow
        );
        assert_eq!(
            AuthError::storage("test").category(),
            ErrorCategory::Infrastructure
        );
    }

    #[test]
    fn test_oauth_error_code() {
        assert_eq!(
            AuthError::invalid_client("test").oauth_error_code(),
            "invalid_client"
        );
        assert_eq!(
            AuthError::invalid_grant("test").oauth_error_code(),
            "invalid_grant"
        );
        assert_eq!(
            AuthError::unauthorized_client("test").oauth_error_code(),
            "unauthorized_client"
        );
        assert_eq!(
            AuthError::AuthorizationPending.oauth_error_code(),
            "authorization_pending"
        );
        assert_eq!(AuthError::SlowDown.oauth_error_code(), "slow_down");
        assert_eq!(AuthError::ExpiredToken.oauth_error_code(), "expired_token");
        assert_eq!(
            AuthError::PkceVerificationFailed.oauth_error_code(),
            "invalid_grant"
        );
        assert_eq!(
            AuthError::consent_required("test").oauth_error_code(),
            "consent_required"
        );
        assert_eq!(
            AuthError::signer_unavailable("test").oauth_error_code(),
            "server_error"
        );
    }

    #[test]
    fn test_error_category_display() {
        assert_eq!(ErrorCategory::Authentication.to_string(), "authentication");
        assert_eq!(ErrorCategory::DeviceFlow.to_string(), "device_flow");
        assert_eq!(ErrorCategory::Interaction.to_string(), "interaction");
        assert_eq!(ErrorCategory::Infrastructure.to_string(), "infrastructure");
    }
}
