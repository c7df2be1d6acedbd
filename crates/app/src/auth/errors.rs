//! Auth service errors.

use sqlx::Error;
use thiserror::Error;

use crate::auth::SessionTokenError;

/// Unique index on `lower(email)`.
pub(crate) const EMAIL_CONSTRAINT: &str = "users_email_key";

#[derive(Debug, Error)]
pub enum AuthServiceError {
    /// Unknown, malformed, expired or revoked bearer token.
    #[error("session not found")]
    NotFound,

    #[error("email is already registered")]
    EmailTaken,

    #[error("invalid credentials")]
    InvalidCredentials,

    #[error("email address is invalid")]
    InvalidEmail,

    #[error("password is too short")]
    WeakPassword,

    #[error("user not found")]
    UserNotFound,

    #[error("user is already an admin")]
    AlreadyAdmin,

    #[error("password hashing failed: {0}")]
    PasswordHash(argon2::password_hash::Error),

    #[error("storage error")]
    Sql(#[source] Error),

    #[error("token processing error")]
    Token(#[source] SessionTokenError),
}

impl From<Error> for AuthServiceError {
    fn from(error: Error) -> Self {
        let email_taken = error
            .as_database_error()
            .is_some_and(|db| db.is_unique_violation() && db.constraint() == Some(EMAIL_CONSTRAINT));

        if email_taken {
            return Self::EmailTaken;
        }

        Self::Sql(error)
    }
}

impl From<SessionTokenError> for AuthServiceError {
    fn from(error: SessionTokenError) -> Self {
        Self::Token(error)
    }
}
