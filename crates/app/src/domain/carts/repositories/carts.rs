//! Carts Repository

use jiff::Timestamp;
use jiff_sqlx::Timestamp as SqlxTimestamp;
use sqlx::{FromRow, Postgres, Row, Transaction, postgres::PgRow, query, query_as};

use crate::auth::UserUuid;

const ENSURE_CART_SQL: &str = include_str!("../sql/ensure_cart.sql");
const GET_CART_SQL: &str = include_str!("../sql/get_cart.sql");
const TOUCH_CART_SQL: &str = include_str!("../sql/touch_cart.sql");

/// Cart header row without items.
#[derive(Debug, Clone)]
pub(crate) struct CartRow {
    pub owner: UserUuid,
    pub updated_at: Timestamp,
}

pub(crate) async fn ensure_cart(
    tx: &mut Transaction<'_, Postgres>,
    owner: UserUuid,
) -> Result<CartRow, sqlx::Error> {
    query(ENSURE_CART_SQL)
        .bind(owner.into_uuid())
        .execute(&mut **tx)
        .await?;

    query_as::<Postgres, CartRow>(GET_CART_SQL)
        .bind(owner.into_uuid())
        .fetch_one(&mut **tx)
        .await
}

pub(crate) async fn touch_cart(
    tx: &mut Transaction<'_, Postgres>,
    owner: UserUuid,
) -> Result<CartRow, sqlx::Error> {
    query(ENSURE_CART_SQL)
        .bind(owner.into_uuid())
        .execute(&mut **tx)
        .await?;

    query_as::<Postgres, CartRow>(TOUCH_CART_SQL)
        .bind(owner.into_uuid())
        .fetch_one(&mut **tx)
        .await
}

impl<'r> FromRow<'r, PgRow> for CartRow {
    fn from_row(row: &'r PgRow) -> sqlx::Result<Self> {
        Ok(Self {
            owner: UserUuid::from_uuid(row.try_get("owner_uuid")?),
            updated_at: row.try_get::<SqlxTimestamp, _>("updated_at")?.to_jiff(),
        })
    }
}
