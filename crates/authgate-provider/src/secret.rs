//! Client credential generation and verification.
//!
//! # Security
//!
//! - Client IDs are 128-bit random values with an "agw_" prefix
//! - Client secrets are 256-bit random values with an "agws_" prefix
//! - Secrets are hashed with Argon2id before storage; the plaintext is
//!   returned to the caller exactly once at creation or rotation
//! - Salts come from OsRng
//!
//! # Example
//!
//! ```
//! use authgate_provider::secret::{generate_client_secret, hash_client_secret, verify_client_secret};
//!
//! let secret = generate_client_secret();
//! assert!(secret.starts_with("agws_"));
//!
//! let hash = hash_client_secret(&secret).unwrap();
//! assert!(verify_client_secret(&secret, &hash).unwrap());
//! ```

use argon2::{
    Argon2,
    password_hash::{PasswordHash, PasswordHasher, PasswordVerifier, SaltString, rand_core::OsRng},
};
use base64::{Engine, engine::general_purpose::URL_SAFE_NO_PAD};
use rand::Rng;

/// Generate a new client identifier.
///
/// # Format
///
/// `agw_{22 base64url characters}` (128 bits of entropy).
#[must_use]
pub fn generate_client_id() -> String {
    let bytes: [u8; 16] = rand::thread_rng().r#gen();
    format!("agw_{}", URL_SAFE_NO_PAD.encode(bytes))
}

/// Generate a new client secret.
///
/// # Format
///
/// `agws_{43 base64url characters}` (256 bits of entropy).
#[must_use]
pub fn generate_client_secret() -> String {
    let bytes: [u8; 32] = rand::thread_rng().r#gen();
    format!("agws_{}", URL_SAFE_NO_PAD.encode(bytes))
}

/// Hash a client secret for storage using Argon2id.
///
/// Uses a random OsRng salt and default Argon2id parameters; the result is
/// a PHC-formatted string.
///
/// # Errors
///
/// Returns `argon2::password_hash::Error` if hashing fails (rare).
pub fn hash_client_secret(secret: &str) -> Result<String, argon2::password_hash::Error> {
    let salt = SaltString::generate(&mut OsRng);
    let argon2 = Argon2::default();
    let hash = argon2.hash_password(secret.as_bytes(), &salt)?;
    Ok(hash.to_string())
}

/// Verify a client secret against a stored Argon2 hash.
///
/// Returns `Ok(true)` on a match, `Ok(false)` on a mismatch.
///
/// # Errors
///
/// Returns an error only if the stored hash is not valid PHC format.
pub fn verify_client_secret(
    secret: &str,
    hash: &str,
) -> Result<bool, argon2::password_hash::Error> {
    let parsed_hash = PasswordHash::new(hash)?;
    let result = Argon2::default().verify_password(secret.as_bytes(), &parsed_hash);
    Ok(result.is_ok())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_client_id_format() {
        let id = generate_client_id();
        assert!(id.starts_with("agw_"));
        assert_eq!(id.len(), 4 + 22); // prefix + base64url of 16 bytes
        assert!(URL_SAFE_NO_PAD.decode(&id[4..]).is_ok());
    }

    #[test]
    fn test_client_secret_format() {
        let secret = generate_client_secret();
        assert!(secret.starts_with("agws_"));
        assert_eq!(secret.len(), 5 + 43); // prefix + base64url of 32 bytes
        assert!(URL_SAFE_NO_PAD.decode(&secret[5..]).is_ok());
    }

    #[test]
    fn test_generation_uniqueness() {
        assert_ne!(generate_client_id(), generate_client_id());
        assert_ne!(generate_client_secret(), generate_client_secret());
    }

    #[test]
    fn test_hash_and_verify() {
        let secret = generate_client_secret();
        let hash = hash_client_secret(&secret).unwrap();

        assert!(hash.starts_with("$argon2id$"));
        assert!(verify_client_secret(&secret, &hash).unwrap());
        assert!(!verify_client_secret("agws_wrong", &hash).unwrap());
    }

    #[test]
    fn test_hash_salts_differ() {
        let secret = generate_client_secret();
        let hash1 = hash_client_secret(&secret).unwrap();
        let hash2 = hash_client_secret(&secret).unwrap();

        assert_ne!(hash1, hash2);
        assert!(verify_client_secret(&secret, &hash1).unwrap());
        assert!(verify_client_secret(&secret, &hash2).unwrap());
    }

    #[test]
    fn test_verify_invalid_hash_format() {
        let result = verify_client_secret("agws_anything", "not-a-phc-hash");
        assert!(result.is_err());
    }
}
