//! Orders Repository

use std::collections::HashMap;

use async_trait::async_trait;
use jiff_sqlx::Timestamp as SqlxTimestamp;
use mockall::automock;
use rust_decimal::Decimal;
use sqlx::{FromRow, Postgres, Row, Transaction, postgres::PgRow, query, query_as};
use uuid::Uuid;

use crate::{
    auth::UserUuid,
    database::Db,
    domain::{
        carts::repositories::delete_ordered_cart_items,
        orders::{
            data::NewOrder,
            records::{OrderLineRecord, OrderRecord, OrderStatus, OrderUuid},
        },
        paging::Page,
        products::records::ProductUuid,
    },
};

const FIND_ORDER_SQL: &str = include_str!("sql/find_order.sql");
const LIST_ORDERS_FOR_OWNER_SQL: &str = include_str!("sql/list_orders_for_owner.sql");
const LIST_ALL_ORDERS_SQL: &str = include_str!("sql/list_all_orders.sql");
const CREATE_ORDER_SQL: &str = include_str!("sql/create_order.sql");
const CREATE_ORDER_LINE_SQL: &str = include_str!("sql/create_order_line.sql");
const GET_ORDER_LINES_SQL: &str = include_str!("sql/get_order_lines.sql");
const TRANSITION_ORDER_SQL: &str = include_str!("sql/transition_order.sql");

#[automock]
#[async_trait]
pub trait OrdersRepository: Send + Sync {
    async fn find_order(&self, order: OrderUuid) -> Result<Option<OrderRecord>, sqlx::Error>;

    /// A user's orders, newest first.
    async fn list_orders_for_owner(
        &self,
        owner: UserUuid,
        page: Page,
    ) -> Result<Vec<OrderRecord>, sqlx::Error>;

    /// Every order, newest first.
    async fn list_all_orders(&self, page: Page) -> Result<Vec<OrderRecord>, sqlx::Error>;

    /// Persist a pending order and drop the ordered lines from the owner's cart in the same
    /// transaction.
    async fn place_order(&self, order: &NewOrder) -> Result<OrderRecord, sqlx::Error>;

    /// Move a pending order to `status`. `None` when the order is no longer pending.
    async fn transition_order(
        &self,
        order: OrderUuid,
        status: OrderStatus,
    ) -> Result<Option<OrderRecord>, sqlx::Error>;
}

#[derive(Debug, Clone)]
pub struct PgOrdersRepository {
    db: Db,
}

impl PgOrdersRepository {
    #[must_use]
    pub fn new(db: Db) -> Self {
        Self { db }
    }
}

#[async_trait]
impl OrdersRepository for PgOrdersRepository {
    async fn find_order(&self, order: OrderUuid) -> Result<Option<OrderRecord>, sqlx::Error> {
        let mut tx = self.db.begin().await?;

        let header = query_as::<Postgres, OrderRow>(FIND_ORDER_SQL)
            .bind(order.into_uuid())
            .fetch_optional(&mut *tx)
            .await?;

        let found = match header {
            Some(header) => attach_lines(&mut tx, vec![header]).await?.pop(),
            None => None,
        };

        tx.commit().await?;

        Ok(found)
    }

    async fn list_orders_for_owner(
        &self,
        owner: UserUuid,
        page: Page,
    ) -> Result<Vec<OrderRecord>, sqlx::Error> {
        let mut tx = self.db.begin().await?;

        let headers = query_as::<Postgres, OrderRow>(LIST_ORDERS_FOR_OWNER_SQL)
            .bind(owner.into_uuid())
            .bind(page.offset())
            .bind(page.row_limit())
            .fetch_all(&mut *tx)
            .await?;

        let orders = attach_lines(&mut tx, headers).await?;

        tx.commit().await?;

        Ok(orders)
    }

    async fn list_all_orders(&self, page: Page) -> Result<Vec<OrderRecord>, sqlx::Error> {
        let mut tx = self.db.begin().await?;

        let headers = query_as::<Postgres, OrderRow>(LIST_ALL_ORDERS_SQL)
            .bind(page.offset())
            .bind(page.row_limit())
            .fetch_all(&mut *tx)
            .await?;

        let orders = attach_lines(&mut tx, headers).await?;

        tx.commit().await?;

        Ok(orders)
    }

    async fn place_order(&self, order: &NewOrder) -> Result<OrderRecord, sqlx::Error> {
        let mut tx = self.db.begin().await?;

        let header = query_as::<Postgres, OrderRow>(CREATE_ORDER_SQL)
            .bind(order.uuid.into_uuid())
            .bind(order.owner.into_uuid())
            .bind(order.total)
            .bind(&order.currency)
            .fetch_one(&mut *tx)
            .await?;

        for (index, line) in order.lines.iter().enumerate() {
            let line_number = i32::try_from(index + 1).map_err(|e| sqlx::Error::Encode(Box::new(e)))?;
            let quantity =
                i32::try_from(line.quantity).map_err(|e| sqlx::Error::Encode(Box::new(e)))?;

            query(CREATE_ORDER_LINE_SQL)
                .bind(order.uuid.into_uuid())
                .bind(line_number)
                .bind(line.product_ref.into_uuid())
                .bind(line.catalog_id)
                .bind(&line.name)
                .bind(line.unit_price)
                .bind(quantity)
                .bind(line.line_total)
                .execute(&mut *tx)
                .await?;
        }

        let ordered: Vec<i64> = order.lines.iter().map(|line| line.catalog_id).collect();

        delete_ordered_cart_items(&mut tx, order.owner, &ordered).await?;

        tx.commit().await?;

        Ok(header.into_record(order.lines.clone()))
    }

    async fn transition_order(
        &self,
        order: OrderUuid,
        status: OrderStatus,
    ) -> Result<Option<OrderRecord>, sqlx::Error> {
        let mut tx = self.db.begin().await?;

        let transitioned = transition_order(&mut tx, order, status).await?;

        tx.commit().await?;

        Ok(transitioned)
    }
}

/// Compare-and-set `pending -> status` inside a caller-owned transaction.
pub(crate) async fn transition_order(
    tx: &mut Transaction<'_, Postgres>,
    order: OrderUuid,
    status: OrderStatus,
) -> Result<Option<OrderRecord>, sqlx::Error> {
    let header = query_as::<Postgres, OrderRow>(TRANSITION_ORDER_SQL)
        .bind(order.into_uuid())
        .bind(status.as_str())
        .fetch_optional(&mut **tx)
        .await?;

    match header {
        Some(header) => Ok(attach_lines(tx, vec![header]).await?.pop()),
        None => Ok(None),
    }
}

async fn attach_lines(
    tx: &mut Transaction<'_, Postgres>,
    headers: Vec<OrderRow>,
) -> Result<Vec<OrderRecord>, sqlx::Error> {
    if headers.is_empty() {
        return Ok(Vec::new());
    }

    let order_uuids: Vec<Uuid> = headers.iter().map(|header| header.uuid.into_uuid()).collect();

    let rows = query_as::<Postgres, OrderLineRow>(GET_ORDER_LINES_SQL)
        .bind(&order_uuids)
        .fetch_all(&mut **tx)
        .await?;

    let mut lines: HashMap<Uuid, Vec<OrderLineRecord>> = HashMap::new();

    for row in rows {
        lines.entry(row.order_uuid).or_default().push(row.line);
    }

    Ok(headers
        .into_iter()
        .map(|header| {
            let order_lines = lines.remove(&header.uuid.into_uuid()).unwrap_or_default();

            header.into_record(order_lines)
        })
        .collect())
}

#[derive(Debug)]
struct OrderRow {
    uuid: OrderUuid,
    owner: UserUuid,
    total: Decimal,
    currency: String,
    status: OrderStatus,
    created_at: jiff::Timestamp,
    updated_at: jiff::Timestamp,
}

impl OrderRow {
    fn into_record(self, lines: Vec<OrderLineRecord>) -> OrderRecord {
        OrderRecord {
            uuid: self.uuid,
            owner: self.owner,
            lines,
            total: self.total,
            currency: self.currency,
            status: self.status,
            created_at: self.created_at,
            updated_at: self.updated_at,
        }
    }
}

impl<'r> FromRow<'r, PgRow> for OrderRow {
    fn from_row(row: &'r PgRow) -> sqlx::Result<Self> {
        let status: String = row.try_get("status")?;

        let status = status
            .parse::<OrderStatus>()
            .map_err(|e| sqlx::Error::ColumnDecode {
                index: "status".to_string(),
                source: Box::new(e),
            })?;

        Ok(Self {
            uuid: OrderUuid::from_uuid(row.try_get("uuid")?),
            owner: UserUuid::from_uuid(row.try_get("owner_uuid")?),
            total: row.try_get("total")?,
            currency: row.try_get("currency")?,
            status,
            created_at: row.try_get::<SqlxTimestamp, _>("created_at")?.to_jiff(),
            updated_at: row.try_get::<SqlxTimestamp, _>("updated_at")?.to_jiff(),
        })
    }
}

struct OrderLineRow {
    order_uuid: Uuid,
    line: OrderLineRecord,
}

impl<'r> FromRow<'r, PgRow> for OrderLineRow {
    fn from_row(row: &'r PgRow) -> sqlx::Result<Self> {
        let quantity_i32: i32 = row.try_get("quantity")?;

        let quantity = u32::try_from(quantity_i32).map_err(|e| sqlx::Error::ColumnDecode {
            index: "quantity".to_string(),
            source: Box::new(e),
        })?;

        Ok(Self {
            order_uuid: row.try_get("order_uuid")?,
            line: OrderLineRecord {
                product_ref: ProductUuid::from_uuid(row.try_get("product_uuid")?),
                catalog_id: row.try_get("catalog_id")?,
                name: row.try_get("name")?,
                unit_price: row.try_get("unit_price")?,
                quantity,
                line_total: row.try_get("line_total")?,
            },
        })
    }
}
