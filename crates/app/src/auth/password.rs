//! Password hashing.

use argon2::{
    Argon2,
    password_hash::{PasswordHash, PasswordHasher, PasswordVerifier, SaltString, rand_core::OsRng},
};

use crate::auth::AuthServiceError;

/// Minimum password length.
pub const MIN_PASSWORD_LENGTH: usize = 6;

/// Hash a password using Argon2id.
pub(crate) fn hash_password(password: &str) -> Result<String, AuthServiceError> {
    let salt = SaltString::generate(&mut OsRng);

    Argon2::default()
        .hash_password(password.as_bytes(), &salt)
        .map(|hash| hash.to_string())
        .map_err(AuthServiceError::PasswordHash)
}

/// Verify a password against a stored hash.
pub(crate) fn verify_password(password: &str, hash: &str) -> Result<(), AuthServiceError> {
    let parsed_hash = PasswordHash::new(hash)
        .ok()
        .ok_or(AuthServiceError::InvalidCredentials)?;

    if Argon2::default()
        .verify_password(password.as_bytes(), &parsed_hash)
        .is_err()
    {
        return Err(AuthServiceError::InvalidCredentials);
    }

    Ok(())
}

pub(crate) fn validate_password(password: &str) -> Result<(), AuthServiceError> {
    if password.chars().count() < MIN_PASSWORD_LENGTH {
        return Err(AuthServiceError::WeakPassword);
    }

    Ok(())
}

/// Trim and lower-case an email address, rejecting anything without a local part and domain.
pub(crate) fn normalize_email(email: &str) -> Result<String, AuthServiceError> {
    let email = email.trim().to_lowercase();

    match email.split_once('@') {
        Some((local, domain)) if !local.is_empty() && !domain.is_empty() => Ok(email),
        _ => Err(AuthServiceError::InvalidEmail),
    }
}
