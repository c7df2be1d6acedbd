//! Auth request and response bodies.

use salvo::oapi::ToSchema;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use bazaar_app::auth::{IssuedSession, UserRecord};

/// Email and password credentials
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub(crate) struct CredentialsRequest {
    pub email: String,
    pub password: String,
}

/// User Response
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub(crate) struct UserResponse {
    /// The unique identifier of the user
    pub uuid: Uuid,

    /// Normalized email address
    pub email: String,

    /// `user` or `admin`
    pub role: String,

    /// The date and time the account was created
    pub created_at: String,
}

impl From<UserRecord> for UserResponse {
    fn from(user: UserRecord) -> Self {
        Self {
            uuid: user.uuid.into_uuid(),
            email: user.email,
            role: user.role.to_string(),
            created_at: user.created_at.to_string(),
        }
    }
}

/// Token Response
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub(crate) struct TokenResponse {
    /// Bearer token; shown once
    pub access_token: String,

    /// Always `bearer`
    pub token_type: String,

    /// The date and time the token stops being accepted
    pub expires_at: String,

    /// The authenticated user
    pub user: UserResponse,
}

impl From<IssuedSession> for TokenResponse {
    fn from(session: IssuedSession) -> Self {
        Self {
            access_token: session.token,
            token_type: "bearer".to_string(),
            expires_at: session.expires_at.to_string(),
            user: session.user.into(),
        }
    }
}

