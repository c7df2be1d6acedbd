//! Cart Items Repository

use sqlx::{FromRow, Postgres, Row, Transaction, postgres::PgRow, query, query_as};

use crate::{auth::UserUuid, domain::carts::records::CartItemRecord};

const GET_CART_ITEMS_SQL: &str = include_str!("../sql/get_cart_items.sql");
const UPSERT_CART_ITEM_SQL: &str = include_str!("../sql/upsert_cart_item.sql");
const DELETE_CART_ITEM_SQL: &str = include_str!("../sql/delete_cart_item.sql");
const CLEAR_CART_ITEMS_SQL: &str = include_str!("../sql/clear_cart_items.sql");
const DELETE_ORDERED_CART_ITEMS_SQL: &str = include_str!("../sql/delete_ordered_cart_items.sql");

pub(crate) async fn get_cart_items(
    tx: &mut Transaction<'_, Postgres>,
    owner: UserUuid,
) -> Result<Vec<CartItemRecord>, sqlx::Error> {
    query_as::<Postgres, CartItemRecord>(GET_CART_ITEMS_SQL)
        .bind(owner.into_uuid())
        .fetch_all(&mut **tx)
        .await
}

/// Insert a line, or add to the quantity of the existing line for the same product.
///
/// Returns `false` when the merged quantity would not fit the column; the line is left as is.
pub(crate) async fn upsert_cart_item(
    tx: &mut Transaction<'_, Postgres>,
    owner: UserUuid,
    catalog_id: i64,
    quantity: u32,
) -> Result<bool, sqlx::Error> {
    let quantity = i32::try_from(quantity).map_err(|e| sqlx::Error::Encode(Box::new(e)))?;

    let rows_affected = query(UPSERT_CART_ITEM_SQL)
        .bind(owner.into_uuid())
        .bind(catalog_id)
        .bind(quantity)
        .execute(&mut **tx)
        .await?
        .rows_affected();

    Ok(rows_affected > 0)
}

pub(crate) async fn delete_cart_item(
    tx: &mut Transaction<'_, Postgres>,
    owner: UserUuid,
    catalog_id: i64,
) -> Result<u64, sqlx::Error> {
    let rows_affected = query(DELETE_CART_ITEM_SQL)
        .bind(owner.into_uuid())
        .bind(catalog_id)
        .execute(&mut **tx)
        .await?
        .rows_affected();

    Ok(rows_affected)
}

pub(crate) async fn clear_cart_items(
    tx: &mut Transaction<'_, Postgres>,
    owner: UserUuid,
) -> Result<u64, sqlx::Error> {
    let rows_affected = query(CLEAR_CART_ITEMS_SQL)
        .bind(owner.into_uuid())
        .execute(&mut **tx)
        .await?
        .rows_affected();

    Ok(rows_affected)
}

/// Remove the lines for `catalog_ids`, keeping anything added to the cart since.
pub(crate) async fn delete_ordered_cart_items(
    tx: &mut Transaction<'_, Postgres>,
    owner: UserUuid,
    catalog_ids: &[i64],
) -> Result<u64, sqlx::Error> {
    let rows_affected = query(DELETE_ORDERED_CART_ITEMS_SQL)
        .bind(owner.into_uuid())
        .bind(catalog_ids)
        .execute(&mut **tx)
        .await?
        .rows_affected();

    Ok(rows_affected)
}

impl<'r> FromRow<'r, PgRow> for CartItemRecord {
    fn from_row(row: &'r PgRow) -> sqlx::Result<Self> {
        let quantity_i32: i32 = row.try_get("quantity")?;

        let quantity = u32::try_from(quantity_i32).map_err(|e| sqlx::Error::ColumnDecode {
            index: "quantity".to_string(),
            source: Box::new(e),
        })?;

        Ok(Self {
            catalog_id: row.try_get("catalog_id")?,
            quantity,
        })
    }
}
