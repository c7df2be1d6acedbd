//! Auth repositories.

use async_trait::async_trait;
use jiff::Timestamp;
use jiff_sqlx::Timestamp as SqlxTimestamp;
use mockall::automock;
use sqlx::{FromRow, Postgres, Row, postgres::PgRow, query, query_as, query_scalar};

use crate::{
    auth::{
        data::{NewSession, NewUser},
        records::{Role, SessionRecord, SessionUuid, UserRecord, UserUuid},
    },
    database::Db,
};

const FIND_USER_SQL: &str = include_str!("sql/find_user.sql");
const FIND_USER_BY_EMAIL_SQL: &str = include_str!("sql/find_user_by_email.sql");
const CREATE_USER_SQL: &str = include_str!("sql/create_user.sql");
const SET_USER_ROLE_SQL: &str = include_str!("sql/set_user_role.sql");
const SAVE_ADMIN_SQL: &str = include_str!("sql/save_admin.sql");
const CREATE_SESSION_SQL: &str = include_str!("sql/create_session.sql");
const FIND_ACTIVE_SESSION_SQL: &str = include_str!("sql/find_active_session.sql");
const TOUCH_SESSION_SQL: &str = include_str!("sql/touch_session.sql");
const REVOKE_SESSION_SQL: &str = include_str!("sql/revoke_session.sql");

#[automock]
#[async_trait]
pub trait UsersRepository: Send + Sync {
    async fn find_user(&self, user: UserUuid) -> Result<Option<UserRecord>, sqlx::Error>;

    /// Case-insensitive lookup.
    async fn find_by_email(&self, email: &str) -> Result<Option<UserRecord>, sqlx::Error>;

    async fn create_user(&self, user: &NewUser) -> Result<UserRecord, sqlx::Error>;

    async fn set_role(&self, user: UserUuid, role: Role)
    -> Result<Option<UserRecord>, sqlx::Error>;

    /// Insert an admin, or promote an existing account and replace its password.
    async fn save_admin(&self, user: &NewUser) -> Result<UserRecord, sqlx::Error>;
}

#[automock]
#[async_trait]
pub trait SessionsRepository: Send + Sync {
    /// Persist a session, returning when it expires.
    async fn create_session(&self, session: &NewSession) -> Result<Timestamp, sqlx::Error>;

    /// Unexpired, unrevoked session of the given version.
    async fn find_active_session(
        &self,
        session: SessionUuid,
        version: i16,
    ) -> Result<Option<SessionRecord>, sqlx::Error>;

    async fn touch_session(&self, session: SessionUuid) -> Result<(), sqlx::Error>;

    /// Returns `false` when the session was already revoked.
    async fn revoke_session(&self, session: SessionUuid) -> Result<bool, sqlx::Error>;
}

#[derive(Debug, Clone)]
pub struct PgUsersRepository {
    db: Db,
}

impl PgUsersRepository {
    #[must_use]
    pub fn new(db: Db) -> Self {
        Self { db }
    }
}

#[async_trait]
impl UsersRepository for PgUsersRepository {
    async fn find_user(&self, user: UserUuid) -> Result<Option<UserRecord>, sqlx::Error> {
        query_as::<Postgres, UserRecord>(FIND_USER_SQL)
            .bind(user.into_uuid())
            .fetch_optional(self.db.pool())
            .await
    }

    async fn find_by_email(&self, email: &str) -> Result<Option<UserRecord>, sqlx::Error> {
        query_as::<Postgres, UserRecord>(FIND_USER_BY_EMAIL_SQL)
            .bind(email)
            .fetch_optional(self.db.pool())
            .await
    }

    async fn create_user(&self, user: &NewUser) -> Result<UserRecord, sqlx::Error> {
        let mut tx = self.db.begin().await?;

        let created = query_as::<Postgres, UserRecord>(CREATE_USER_SQL)
            .bind(user.uuid.into_uuid())
            .bind(&user.email)
            .bind(&user.password_hash)
            .bind(user.role.as_str())
            .fetch_one(&mut *tx)
            .await?;

        tx.commit().await?;

        Ok(created)
    }

    async fn set_role(
        &self,
        user: UserUuid,
        role: Role,
    ) -> Result<Option<UserRecord>, sqlx::Error> {
        let mut tx = self.db.begin().await?;

        let updated = query_as::<Postgres, UserRecord>(SET_USER_ROLE_SQL)
            .bind(user.into_uuid())
            .bind(role.as_str())
            .fetch_optional(&mut *tx)
            .await?;

        tx.commit().await?;

        Ok(updated)
    }

    async fn save_admin(&self, user: &NewUser) -> Result<UserRecord, sqlx::Error> {
        let mut tx = self.db.begin().await?;

        let saved = query_as::<Postgres, UserRecord>(SAVE_ADMIN_SQL)
            .bind(user.uuid.into_uuid())
            .bind(&user.email)
            .bind(&user.password_hash)
            .fetch_one(&mut *tx)
            .await?;

        tx.commit().await?;

        Ok(saved)
    }
}

#[derive(Debug, Clone)]
pub struct PgSessionsRepository {
    db: Db,
}

impl PgSessionsRepository {
    #[must_use]
    pub fn new(db: Db) -> Self {
        Self { db }
    }
}

#[async_trait]
impl SessionsRepository for PgSessionsRepository {
    async fn create_session(&self, session: &NewSession) -> Result<Timestamp, sqlx::Error> {
        let ttl_minutes =
            i32::try_from(session.ttl_minutes).map_err(|e| sqlx::Error::Encode(Box::new(e)))?;

        let mut tx = self.db.begin().await?;

        let expires_at = query_scalar::<Postgres, SqlxTimestamp>(CREATE_SESSION_SQL)
            .bind(session.uuid.into_uuid())
            .bind(session.user.into_uuid())
            .bind(session.version.as_i16())
            .bind(&session.token_hash)
            .bind(ttl_minutes)
            .fetch_one(&mut *tx)
            .await?;

        tx.commit().await?;

        Ok(expires_at.to_jiff())
    }

    async fn find_active_session(
        &self,
        session: SessionUuid,
        version: i16,
    ) -> Result<Option<SessionRecord>, sqlx::Error> {
        query_as::<Postgres, SessionRecord>(FIND_ACTIVE_SESSION_SQL)
            .bind(session.into_uuid())
            .bind(version)
            .fetch_optional(self.db.pool())
            .await
    }

    async fn touch_session(&self, session: SessionUuid) -> Result<(), sqlx::Error> {
        query(TOUCH_SESSION_SQL)
            .bind(session.into_uuid())
            .execute(self.db.pool())
            .await?;

        Ok(())
    }

    async fn revoke_session(&self, session: SessionUuid) -> Result<bool, sqlx::Error> {
        let rows_affected = query(REVOKE_SESSION_SQL)
            .bind(session.into_uuid())
            .execute(self.db.pool())
            .await?
            .rows_affected();

        Ok(rows_affected == 1)
    }
}

fn decode_role(row: &PgRow) -> sqlx::Result<Role> {
    let role: String = row.try_get("role")?;

    role.parse::<Role>().map_err(|e| sqlx::Error::ColumnDecode {
        index: "role".to_string(),
        source: Box::new(e),
    })
}

impl<'r> FromRow<'r, PgRow> for UserRecord {
    fn from_row(row: &'r PgRow) -> sqlx::Result<Self> {
        Ok(Self {
            uuid: UserUuid::from_uuid(row.try_get("uuid")?),
            email: row.try_get("email")?,
            password_hash: row.try_get("password_hash")?,
            role: decode_role(row)?,
            created_at: row.try_get::<SqlxTimestamp, _>("created_at")?.to_jiff(),
        })
    }
}

impl<'r> FromRow<'r, PgRow> for SessionRecord {
    fn from_row(row: &'r PgRow) -> sqlx::Result<Self> {
        Ok(Self {
            uuid: SessionUuid::from_uuid(row.try_get("uuid")?),
            user: UserUuid::from_uuid(row.try_get("user_uuid")?),
            role: decode_role(row)?,
            version: row.try_get("version")?,
            token_hash: row.try_get("token_hash")?,
            expires_at: row.try_get::<SqlxTimestamp, _>("expires_at")?.to_jiff(),
        })
    }
}
