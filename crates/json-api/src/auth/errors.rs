//! Auth Errors

use salvo::http::StatusError;
use tracing::error;

use bazaar_app::auth::AuthServiceError;

pub(crate) fn into_status_error(error: AuthServiceError) -> StatusError {
    match error {
        AuthServiceError::NotFound => StatusError::unauthorized().brief("Invalid or expired token"),
        AuthServiceError::InvalidCredentials => {
            StatusError::unauthorized().brief("Incorrect email or password")
        }
        AuthServiceError::EmailTaken => StatusError::bad_request().brief("Email already registered"),
        AuthServiceError::InvalidEmail => StatusError::bad_request().brief("Invalid email address"),
        AuthServiceError::WeakPassword => StatusError::bad_request().brief("Password is too short"),
        AuthServiceError::AlreadyAdmin => StatusError::bad_request().brief("User is already an admin"),
        AuthServiceError::UserNotFound => StatusError::not_found().brief("User not found"),
        AuthServiceError::PasswordHash(source) => {
            error!("failed to hash password: {source}");

            StatusError::internal_server_error()
        }
        AuthServiceError::Sql(source) => {
            error!("auth storage error: {source}");

            StatusError::internal_server_error()
        }
        AuthServiceError::Token(source) => {
            error!("failed to process session token: {source}");

            StatusError::internal_server_error()
        }
    }
}
