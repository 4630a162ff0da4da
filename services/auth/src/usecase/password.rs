//! Argon2id password hashing and the signup/reset strength policy.

use argon2::Argon2;
use argon2::password_hash::{
    PasswordHash, PasswordHasher, PasswordVerifier, SaltString, rand_core::OsRng,
};

use crate::error::AuthServiceError;

/// Hash a password with Argon2id and a fresh random salt, returning the PHC
/// string (salt and parameters embedded).
pub fn hash_password(password: &str) -> Result<String, AuthServiceError> {
    let salt = SaltString::generate(&mut OsRng);
    let hash = Argon2::default()
        .hash_password(password.as_bytes(), &salt)
        .map_err(|e| anyhow::anyhow!("hash password: {e}"))?;
    Ok(hash.to_string())
}

/// Verify a password against a stored PHC hash. A mismatch is `Ok(false)`;
/// only an unparseable hash is an error.
pub fn verify_password(password: &str, hash: &str) -> Result<bool, AuthServiceError> {
    let parsed = PasswordHash::new(hash).map_err(|e| anyhow::anyhow!("parse password hash: {e}"))?;
    Ok(Argon2::default()
        .verify_password(password.as_bytes(), &parsed)
        .is_ok())
}

/// Minimum 8 characters with at least one digit, one uppercase and one
/// lowercase letter.
pub fn validate_password_strength(password: &str) -> Result<(), AuthServiceError> {
    let long_enough = password.chars().count() >= 8;
    let has_digit = password.chars().any(|c| c.is_ascii_digit());
    let has_upper = password.chars().any(|c| c.is_uppercase());
    let has_lower = password.chars().any(|c| c.is_lowercase());
    if long_enough && has_digit && has_upper && has_lower {
        Ok(())
    } else {
        Err(AuthServiceError::WeakPassword)
    }
}
