//! PKCE (Proof Key for Code Exchange) implementation.
//!
//! Implements RFC 7636 with both the S256 and plain methods. S256 is the
//! default; public clients are expected to send it. Challenge comparison is
//! constant-time for either method.
//!
//! # Example
//!
//! ```
//! use authgate_provider::oauth::{PkceVerifier, PkceChallenge, PkceChallengeMethod};
//!
//! // Client generates a verifier and challenge
//! let verifier = PkceVerifier::generate();
//! let challenge = PkceChallenge::from_verifier(&verifier, PkceChallengeMethod::S256);
//!
//! // Server stores the challenge, later verifies with the verifier from the
//! // token request
//! let stored = PkceChallenge::new(challenge.as_str().to_string()).unwrap();
//! assert!(stored.verify(&verifier, PkceChallengeMethod::S256).is_ok());
//! ```

use base64::{Engine, engine::general_purpose::URL_SAFE_NO_PAD};
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};

// =============================================================================
// Error Types
// =============================================================================

/// Errors that can occur during PKCE operations.
#[derive(Debug, thiserror::Error)]
pub enum PkceError {
    /// Verifier length is outside the valid range (43-128 characters).
    #[error("Invalid verifier length: must be 43-128 characters, got {0}")]
    InvalidVerifierLength(usize),

    /// Verifier contains invalid characters.
    #[error("Invalid verifier characters: must be unreserved characters ([A-Za-z0-9-._~])")]
    InvalidVerifierCharacters,

    /// Challenge is empty or otherwise malformed.
    #[error("Invalid challenge format")]
    InvalidChallengeFormat,

    /// Unsupported challenge method.
    #[error("Unsupported challenge method: {0}. Supported methods are S256 and plain.")]
    UnsupportedMethod(String),

    /// PKCE verification failed (verifier doesn't match challenge).
    #[error("PKCE verification failed: verifier does not match challenge")]
    VerificationFailed,
}

impl PkceError {
    // -------------------------------------------------------------------------
    // Constructor Methods
    // -------------------------------------------------------------------------

    /// Create an `InvalidVerifierLength` error.
    #[must_use]
    pub fn invalid_verifier_length(len: usize) -> Self {
        Self::InvalidVerifierLength(len)
    }

    /// Create an `InvalidVerifierCharacters` error.
    #[must_use]
    pub fn invalid_verifier_characters() -> Self {
        Self::InvalidVerifierCharacters
    }

    /// Create an `InvalidChallengeFormat` error.
    #[must_use]
    pub fn invalid_challenge_format() -> Self {
        Self::InvalidChallengeFormat
    }

    /// Create an `UnsupportedMethod` error.
    #[must_use]
    pub fn unsupported_method(method: impl Into<String>) -> Self {
        Self::UnsupportedMethod(method.into())
    }

    /// Create a `VerificationFailed` error.
    #[must_use]
    pub fn verification_failed() -> Self {
        Self::VerificationFailed
    }

    // -------------------------------------------------------------------------
    // Predicate Methods
    // -------------------------------------------------------------------------

    /// Returns `true` if this is a verifier validation error.
    #[must_use]
    pub fn is_verifier_error(&self) -> bool {
        matches!(
            self,
            Self::InvalidVerifierLength(_) | Self::InvalidVerifierCharacters
        )
    }

    /// Returns `true` if this is a challenge validation error.
    #[must_use]
    pub fn is_challenge_error(&self) -> bool {
        matches!(
            self,
            Self::InvalidChallengeFormat | Self::UnsupportedMethod(_)
        )
    }

    /// Returns `true` if this is a verification failure.
    #[must_use]
    pub fn is_verification_error(&self) -> bool {
        matches!(self, Self::VerificationFailed)
    }

    /// Get the OAuth 2.0 error code for this error.
    #[must_use]
    pub fn oauth_error_code(&self) -> &'static str {
        match self {
            Self::InvalidVerifierLength(_)
            | Self::InvalidVerifierCharacters
            | Self::InvalidChallengeFormat
            | Self::UnsupportedMethod(_) => "invalid_request",
            Self::VerificationFailed => "invalid_grant",
        }
    }
}

// =============================================================================
// PKCE Challenge Method
// =============================================================================

/// PKCE challenge method.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum PkceChallengeMethod {
    /// SHA-256 hash: `code_challenge = BASE64URL(SHA256(ASCII(code_verifier)))`.
    S256,
    /// Identity transform: `code_challenge = code_verifier`.
    #[serde(rename = "plain")]
    Plain,
}

impl PkceChallengeMethod {
    /// Parse challenge method from string.
    ///
    /// # Errors
    ///
    /// Returns `PkceError::UnsupportedMethod` if the method is neither
    /// "S256" nor "plain".
    pub fn parse(method: &str) -> Result<Self, PkceError> {
        match method {
            "S256" => Ok(Self::S256),
            "plain" => Ok(Self::Plain),
            other => Err(PkceError::unsupported_method(other)),
        }
    }

    /// Get the method as a string.
    #[must_use]
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::S256 => "S256",
            Self::Plain => "plain",
        }
    }
}

impl std::fmt::Display for PkceChallengeMethod {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl Default for PkceChallengeMethod {
    fn default() -> Self {
        Self::S256
    }
}

// =============================================================================
// PKCE Verifier
// =============================================================================

/// PKCE code verifier.
///
/// A high-entropy cryptographic random string using the unreserved characters
/// `[A-Z] / [a-z] / [0-9] / "-" / "." / "_" / "~"`, with a minimum length of
/// 43 characters and a maximum length of 128 characters.
///
/// # RFC 7636 Specification
///
/// From Section 4.1:
/// > code_verifier = high-entropy cryptographic random STRING using the
/// > unreserved characters [A-Z] / [a-z] / [0-9] / "-" / "." / "_" / "~"
/// > from Section 2.3 of [RFC3986], with a minimum length of 43 characters
/// > and a maximum length of 128 characters.
#[derive(Debug, Clone)]
pub struct PkceVerifier(String);

impl PkceVerifier {
    /// Create a new verifier from a string.
    ///
    /// # Errors
    ///
    /// Returns an error if:
    /// - Length is not between 43 and 128 characters
    /// - Contains characters other than `[A-Za-z0-9-._~]`
    pub fn new(verifier: String) -> Result<Self, PkceError> {
        let len = verifier.len();

        // RFC 7636: verifier must be 43-128 characters
        if !(43..=128).contains(&len) {
            return Err(PkceError::invalid_verifier_length(len));
        }

        // Unreserved characters only: [A-Z], [a-z], [0-9], '-', '.', '_', '~'
        if !verifier
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || c == '-' || c == '.' || c == '_' || c == '~')
        {
            return Err(PkceError::invalid_verifier_characters());
        }

        Ok(Self(verifier))
    }

    /// Generate a cryptographically random verifier.
    ///
    /// Generates 32 random bytes and encodes them as base64url (43 characters).
    #[must_use]
    pub fn generate() -> Self {
        use rand::Rng;
        let mut rng = rand::thread_rng();
        // `gen` is a reserved keyword in Rust 2024, so we use r#gen
        let bytes: [u8; 32] = rng.r#gen();
        let verifier = URL_SAFE_NO_PAD.encode(bytes);
        Self(verifier)
    }

    /// Get the verifier as a string slice.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Consume the verifier and return the inner string.
    #[must_use]
    pub fn into_inner(self) -> String {
        self.0
    }
}

impl AsRef<str> for PkceVerifier {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

// =============================================================================
// PKCE Challenge
// =============================================================================

/// PKCE code challenge.
///
/// For S256 the challenge is the base64url-encoded SHA-256 hash of the
/// verifier; for plain it is the verifier itself.
///
/// # RFC 7636 Specification
///
/// From Section 4.2:
/// > S256
/// >    code_challenge = BASE64URL(SHA256(ASCII(code_verifier)))
/// > plain
/// >    code_challenge = code_verifier
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PkceChallenge(String);

impl PkceChallenge {
    /// Create a challenge from a verifier using the given method.
    #[must_use]
    pub fn from_verifier(verifier: &PkceVerifier, method: PkceChallengeMethod) -> Self {
        match method {
            PkceChallengeMethod::S256 => {
                let mut hasher = Sha256::new();
                hasher.update(verifier.0.as_bytes());
                let hash = hasher.finalize();
                Self(URL_SAFE_NO_PAD.encode(hash))
            }
            PkceChallengeMethod::Plain => Self(verifier.0.clone()),
        }
    }

    /// Create a challenge from a raw string (received from client).
    ///
    /// # Errors
    ///
    /// Returns `PkceError::InvalidChallengeFormat` if the string is empty or
    /// contains characters outside the unreserved set.
    pub fn new(challenge: String) -> Result<Self, PkceError> {
        if challenge.is_empty()
            || !challenge
                .chars()
                .all(|c| c.is_ascii_alphanumeric() || c == '-' || c == '.' || c == '_' || c == '~')
        {
            return Err(PkceError::invalid_challenge_format());
        }
        Ok(Self(challenge))
    }

    /// Verify that a verifier matches this challenge under the given method.
    ///
    /// The comparison is constant-time in the challenge contents so timing
    /// does not leak how many leading characters matched.
    ///
    /// # Errors
    ///
    /// Returns `PkceError::VerificationFailed` if the verifier doesn't match.
    pub fn verify(
        &self,
        verifier: &PkceVerifier,
        method: PkceChallengeMethod,
    ) -> Result<(), PkceError> {
        let expected = Self::from_verifier(verifier, method);
        if constant_time_eq(self.0.as_bytes(), expected.0.as_bytes()) {
            Ok(())
        } else {
            Err(PkceError::verification_failed())
        }
    }

    /// Get the challenge as a string slice.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Consume the challenge and return the inner string.
    #[must_use]
    pub fn into_inner(self) -> String {
        self.0
    }
}

impl AsRef<str> for PkceChallenge {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

/// Compares two byte slices without short-circuiting on the first mismatch.
fn constant_time_eq(a: &[u8], b: &[u8]) -> bool {
    if a.len() != b.len() {
        return false;
    }
    let mut diff = 0u8;
    for (x, y) in a.iter().zip(b.iter()) {
        diff |= x ^ y;
    }
    diff == 0
}

// =============================================================================
// Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    // -------------------------------------------------------------------------
    // Verifier Tests
    // -------------------------------------------------------------------------

    #[test]
    fn test_verifier_generation() {
        let verifier = PkceVerifier::generate();
        let len = verifier.as_str().len();
        assert!(
            (43..=128).contains(&len),
            "Generated verifier length {} should be 43-128",
            len
        );

        // Verify all characters are valid
        assert!(
            verifier
                .as_str()
                .chars()
                .all(|c| c.is_ascii_alphanumeric() || c == '-' || c == '_'),
            "Generated verifier should only contain base64url characters"
        );
    }

    #[test]
    fn test_verifier_generation_uniqueness() {
        let v1 = PkceVerifier::generate();
        let v2 = PkceVerifier::generate();
        let v3 = PkceVerifier::generate();

        assert_ne!(v1.as_str(), v2.as_str());
        assert_ne!(v2.as_str(), v3.as_str());
        assert_ne!(v1.as_str(), v3.as_str());
    }

    #[test]
    fn test_verifier_validation_length_too_short() {
        let short = "a".repeat(42);
        let result = PkceVerifier::new(short);
        assert!(result.is_err());
        assert!(matches!(
            result.unwrap_err(),
            PkceError::InvalidVerifierLength(42)
        ));
    }

    #[test]
    fn test_verifier_validation_length_bounds() {
        assert!(PkceVerifier::new("a".repeat(43)).is_ok());
        assert!(PkceVerifier::new("a".repeat(128)).is_ok());

        let result = PkceVerifier::new("a".repeat(129));
        assert!(matches!(
            result.unwrap_err(),
            PkceError::InvalidVerifierLength(129)
        ));
    }

    #[test]
    fn test_verifier_validation_characters_valid() {
        // All valid unreserved characters from RFC 3986
        let valid = "abcdefghijklmnopqrstuvwxyzABCDEFGHIJKLMNOPQRSTUVWXYZ0123456789-._~"
            .chars()
            .cycle()
            .take(64)
            .collect::<String>();
        assert!(PkceVerifier::new(valid).is_ok());
    }

    #[test]
    fn test_verifier_validation_characters_invalid() {
        let invalid = "abcdefghijklmnopqrstuvwxyz0123456789!@#$%^&*()".to_string();
        let result = PkceVerifier::new(invalid);
        assert!(result.is_err());
        assert!(matches!(
            result.unwrap_err(),
            PkceError::InvalidVerifierCharacters
        ));
    }

    // -------------------------------------------------------------------------
    // Challenge Tests
    // -------------------------------------------------------------------------

    #[test]
    fn test_challenge_from_verifier_s256() {
        let verifier = PkceVerifier::generate();
        let challenge = PkceChallenge::from_verifier(&verifier, PkceChallengeMethod::S256);

        // SHA-256 produces 32 bytes, base64url encoded = 43 characters
        assert_eq!(challenge.as_str().len(), 43);
        assert_ne!(challenge.as_str(), verifier.as_str());
    }

    #[test]
    fn test_challenge_from_verifier_plain() {
        let verifier = PkceVerifier::generate();
        let challenge = PkceChallenge::from_verifier(&verifier, PkceChallengeMethod::Plain);
        assert_eq!(challenge.as_str(), verifier.as_str());
    }

    #[test]
    fn test_challenge_verification_s256() {
        let verifier = PkceVerifier::generate();
        let challenge = PkceChallenge::from_verifier(&verifier, PkceChallengeMethod::S256);
        assert!(challenge.verify(&verifier, PkceChallengeMethod::S256).is_ok());

        let other = PkceVerifier::generate();
        let result = challenge.verify(&other, PkceChallengeMethod::S256);
        assert!(matches!(result.unwrap_err(), PkceError::VerificationFailed));
    }

    #[test]
    fn test_challenge_verification_plain() {
        let verifier = PkceVerifier::generate();
        let challenge = PkceChallenge::from_verifier(&verifier, PkceChallengeMethod::Plain);
        assert!(
            challenge
                .verify(&verifier, PkceChallengeMethod::Plain)
                .is_ok()
        );

        let other = PkceVerifier::generate();
        assert!(challenge.verify(&other, PkceChallengeMethod::Plain).is_err());
    }

    #[test]
    fn test_challenge_method_mismatch_fails() {
        // An S256 challenge never matches under the plain method
        let verifier = PkceVerifier::generate();
        let challenge = PkceChallenge::from_verifier(&verifier, PkceChallengeMethod::S256);
        assert!(
            challenge
                .verify(&verifier, PkceChallengeMethod::Plain)
                .is_err()
        );
    }

    #[test]
    fn test_challenge_new_valid() {
        let valid = "E9Melhoa2OwvFrEMTJguCHaoeK1t8URWbuGJSstw-cM";
        assert!(PkceChallenge::new(valid.to_string()).is_ok());
    }

    #[test]
    fn test_challenge_new_invalid() {
        let result = PkceChallenge::new("not a valid challenge!!!".to_string());
        assert!(matches!(
            result.unwrap_err(),
            PkceError::InvalidChallengeFormat
        ));

        let result = PkceChallenge::new(String::new());
        assert!(matches!(
            result.unwrap_err(),
            PkceError::InvalidChallengeFormat
        ));
    }

    // -------------------------------------------------------------------------
    // Challenge Method Tests
    // -------------------------------------------------------------------------

    #[test]
    fn test_challenge_method_parse() {
        assert_eq!(
            PkceChallengeMethod::parse("S256").unwrap(),
            PkceChallengeMethod::S256
        );
        assert_eq!(
            PkceChallengeMethod::parse("plain").unwrap(),
            PkceChallengeMethod::Plain
        );

        let result = PkceChallengeMethod::parse("s256");
        assert!(matches!(
            result.unwrap_err(),
            PkceError::UnsupportedMethod(_)
        ));
    }

    #[test]
    fn test_challenge_method_as_str() {
        assert_eq!(PkceChallengeMethod::S256.as_str(), "S256");
        assert_eq!(PkceChallengeMethod::Plain.as_str(), "plain");
    }

    #[test]
    fn test_challenge_method_serde() {
        assert_eq!(
            serde_json::to_string(&PkceChallengeMethod::S256).unwrap(),
            r#""S256""#
        );
        assert_eq!(
            serde_json::to_string(&PkceChallengeMethod::Plain).unwrap(),
            r#""plain""#
        );
        let method: PkceChallengeMethod = serde_json::from_str(r#""plain""#).unwrap();
        assert_eq!(method, PkceChallengeMethod::Plain);
    }

    #[test]
    fn test_challenge_method_default() {
        assert_eq!(PkceChallengeMethod::default(), PkceChallengeMethod::S256);
    }

    // -------------------------------------------------------------------------
    // RFC 7636 Test Vector
    // -------------------------------------------------------------------------

    #[test]
    fn test_rfc7636_appendix_b_test_vector() {
        // Test vector from RFC 7636 Appendix B
        // https://tools.ietf.org/html/rfc7636#appendix-B
        let verifier =
            PkceVerifier::new("dBjftJeZ4CVP-mB92K27uhbUJU1p1r_wW1gFWFOEjXk".to_string()).unwrap();

        let challenge = PkceChallenge::from_verifier(&verifier, PkceChallengeMethod::S256);

        assert_eq!(
            challenge.as_str(),
            "E9Melhoa2OwvFrEMTJguCHaoeK1t8URWbuGJSstw-cM",
            "S256 challenge should match RFC 7636 Appendix B test vector"
        );

        let stored =
            PkceChallenge::new("E9Melhoa2OwvFrEMTJguCHaoeK1t8URWbuGJSstw-cM".to_string()).unwrap();
        assert!(stored.verify(&verifier, PkceChallengeMethod::S256).is_ok());
    }

    // -------------------------------------------------------------------------
    // Error Tests
    // -------------------------------------------------------------------------

    #[test]
    fn test_error_predicates() {
        let verifier_len_err = PkceError::invalid_verifier_length(10);
        let verifier_char_err = PkceError::invalid_verifier_characters();
        let challenge_fmt_err = PkceError::invalid_challenge_format();
        let method_err = PkceError::unsupported_method("s256");
        let verify_err = PkceError::verification_failed();

        assert!(verifier_len_err.is_verifier_error());
        assert!(verifier_char_err.is_verifier_error());
        assert!(!verifier_len_err.is_challenge_error());

        assert!(challenge_fmt_err.is_challenge_error());
        assert!(method_err.is_challenge_error());
        assert!(!challenge_fmt_err.is_verifier_error());

        assert!(verify_err.is_verification_error());
        assert!(!verify_err.is_verifier_error());
        assert!(!verify_err.is_challenge_error());
    }

    #[test]
    fn test_error_oauth_codes() {
        assert_eq!(
            PkceError::invalid_verifier_length(10).oauth_error_code(),
            "invalid_request"
        );
        assert_eq!(
            PkceError::unsupported_method("s256").oauth_error_code(),
            "invalid_request"
        );
        assert_eq!(
            PkceError::verification_failed().oauth_error_code(),
            "invalid_grant"
        );
    }
}
