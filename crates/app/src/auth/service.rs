//! Auth service.

use std::{fmt, sync::Arc};

use async_trait::async_trait;
use mockall::automock;
use tracing::{debug, info};

use crate::{
    auth::{
        AuthServiceError, SessionTokenVersion,
        data::{NewSession, NewUser},
        format_session_token, generate_session_secret, parse_session_token,
        password::{hash_password, normalize_email, validate_password, verify_password},
        records::{IssuedSession, Principal, Role, SessionRecord, SessionUuid, UserRecord, UserUuid},
        repository::{PgSessionsRepository, PgUsersRepository, SessionsRepository, UsersRepository},
        session_verifier,
    },
    database::Db,
};

/// Session lifetime when none is configured: one day.
pub const DEFAULT_SESSION_TTL_MINUTES: u32 = 1440;

#[derive(Clone)]
pub struct PgAuthService {
    users: Arc<dyn UsersRepository>,
    sessions: Arc<dyn SessionsRepository>,
    session_ttl_minutes: u32,
}

impl fmt::Debug for PgAuthService {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("PgAuthService")
            .field("session_ttl_minutes", &self.session_ttl_minutes)
            .finish_non_exhaustive()
    }
}

impl PgAuthService {
    #[must_use]
    pub fn new(db: Db, session_ttl_minutes: u32) -> Self {
        Self::with_repositories(
            Arc::new(PgUsersRepository::new(db.clone())),
            Arc::new(PgSessionsRepository::new(db)),
            session_ttl_minutes,
        )
    }

    #[must_use]
    pub fn with_repositories(
        users: Arc<dyn UsersRepository>,
        sessions: Arc<dyn SessionsRepository>,
        session_ttl_minutes: u32,
    ) -> Self {
        Self {
            users,
            sessions,
            session_ttl_minutes,
        }
    }

    async fn issue_session(&self, user: UserRecord) -> Result<IssuedSession, AuthServiceError> {
        let session = SessionUuid::new();
        let version = SessionTokenVersion::V1;
        let secret = generate_session_secret();
        let token = format_session_token(session, version, &secret);

        let expires_at = self
            .sessions
            .create_session(&NewSession {
                uuid: session,
                user: user.uuid,
                version,
                token_hash: session_verifier(session, version, user.uuid, &secret),
                ttl_minutes: self.session_ttl_minutes,
            })
            .await?;

        debug!(user = %user.uuid, session = %session, "issued session");

        Ok(IssuedSession {
            token,
            user,
            expires_at,
        })
    }

    /// Resolve a bearer token to its stored session, checking the secret against the verifier.
    async fn verified_session(&self, bearer_token: &str) -> Result<SessionRecord, AuthServiceError> {
        let parsed = parse_session_token(bearer_token)
            .ok()
            .ok_or(AuthServiceError::NotFound)?;

        let session = self
            .sessions
            .find_active_session(parsed.session, parsed.version.as_i16())
            .await?
            .ok_or(AuthServiceError::NotFound)?;

        let verifier = session_verifier(parsed.session, parsed.version, session.user, &parsed.secret);

        if verifier != session.token_hash {
            return Err(AuthServiceError::NotFound);
        }

        Ok(session)
    }
}

#[async_trait]
impl AuthService for PgAuthService {
    async fn signup(&self, email: &str, password: &str) -> Result<IssuedSession, AuthServiceError> {
        let email = normalize_email(email)?;

        validate_password(password)?;

        if self.users.find_by_email(&email).await?.is_some() {
            return Err(AuthServiceError::EmailTaken);
        }

        let user = self
            .users
            .create_user(&NewUser {
                uuid: UserUuid::new(),
                email,
                password_hash: hash_password(password)?,
                role: Role::User,
            })
            .await?;

        info!(user = %user.uuid, "user signed up");

        self.issue_session(user).await
    }

    async fn login(&self, email: &str, password: &str) -> Result<IssuedSession, AuthServiceError> {
        let email = normalize_email(email)
            .ok()
            .ok_or(AuthServiceError::InvalidCredentials)?;

        let user = self
            .users
            .find_by_email(&email)
            .await?
            .ok_or(AuthServiceError::InvalidCredentials)?;

        verify_password(password, &user.password_hash)?;

        self.issue_session(user).await
    }

    async fn authenticate_bearer(&self, bearer_token: &str) -> Result<Principal, AuthServiceError> {
        let session = self.verified_session(bearer_token).await?;

        // Best-effort metadata update; auth success should not depend on this write.
        if let Err(error) = self.sessions.touch_session(session.uuid).await {
            debug!(session = %session.uuid, %error, "failed to touch session");
        }

        Ok(Principal {
            user: session.user,
            role: session.role,
        })
    }

    async fn get_user(&self, user: UserUuid) -> Result<UserRecord, AuthServiceError> {
        self.users
            .find_user(user)
            .await?
            .ok_or(AuthServiceError::UserNotFound)
    }

    async fn promote_to_admin(&self, email: &str) -> Result<UserRecord, AuthServiceError> {
        let email = normalize_email(email)?;

        let user = self
            .users
            .find_by_email(&email)
            .await?
            .ok_or(AuthServiceError::UserNotFound)?;

        if user.role == Role::Admin {
            return Err(AuthServiceError::AlreadyAdmin);
        }

        let promoted = self
            .users
            .set_role(user.uuid, Role::Admin)
            .await?
            .ok_or(AuthServiceError::UserNotFound)?;

        info!(user = %promoted.uuid, "promoted user to admin");

        Ok(promoted)
    }

    async fn create_admin(&self, email: &str, password: &str) -> Result<UserRecord, AuthServiceError> {
        let email = normalize_email(email)?;

        validate_password(password)?;

        let admin = self
            .users
            .save_admin(&NewUser {
                uuid: UserUuid::new(),
                email,
                password_hash: hash_password(password)?,
                role: Role::Admin,
            })
            .await?;

        info!(user = %admin.uuid, "saved admin account");

        Ok(admin)
    }

    async fn logout(&self, bearer_token: &str) -> Result<(), AuthServiceError> {
        let session = self.verified_session(bearer_token).await?;

        if !self.sessions.revoke_session(session.uuid).await? {
            return Err(AuthServiceError::NotFound);
        }

        debug!(session = %session.uuid, "revoked session");

        Ok(())
    }
}

#[automock]
#[async_trait]
pub trait AuthService: Send + Sync {
    /// Register a new account and open a session for it.
    async fn signup(&self, email: &str, password: &str) -> Result<IssuedSession, AuthServiceError>;

    /// Check credentials and open a session.
    async fn login(&self, email: &str, password: &str) -> Result<IssuedSession, AuthServiceError>;

    /// Resolve a bearer token to the calling principal.
    async fn authenticate_bearer(&self, bearer_token: &str) -> Result<Principal, AuthServiceError>;

    async fn get_user(&self, user: UserUuid) -> Result<UserRecord, AuthServiceError>;

    /// Grant the admin role to an existing user.
    async fn promote_to_admin(&self, email: &str) -> Result<UserRecord, AuthServiceError>;

    /// Create an admin account, or promote an existing one and reset its password.
    async fn create_admin(&self, email: &str, password: &str) -> Result<UserRecord, AuthServiceError>;

    /// Revoke the session behind a bearer token.
    async fn logout(&self, bearer_token: &str) -> Result<(), AuthServiceError>;
}
