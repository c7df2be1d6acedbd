//! Products Repository

use async_trait::async_trait;
use jiff_sqlx::Timestamp as SqlxTimestamp;
use mockall::automock;
use rust_decimal::Decimal;
use sqlx::{FromRow, Postgres, Row, Transaction, postgres::PgRow, query, query_as};

use crate::{
    database::Db,
    domain::{
        paging::Page,
        products::{
            data::{NewProduct, ProductQuery, ProductUpdate},
            records::{ProductRecord, ProductUuid},
        },
    },
};

const LIST_PRODUCTS_SQL: &str = include_str!("sql/list_products.sql");
const FIND_PRODUCT_SQL: &str = include_str!("sql/find_product.sql");
const FIND_PRODUCT_BY_SLUG_SQL: &str = include_str!("sql/find_product_by_slug.sql");
const FIND_PRODUCT_BY_CATALOG_ID_SQL: &str = include_str!("sql/find_product_by_catalog_id.sql");
const CREATE_PRODUCT_SQL: &str = include_str!("sql/create_product.sql");
const UPDATE_PRODUCT_SQL: &str = include_str!("sql/update_product.sql");
const DELETE_PRODUCT_SQL: &str = include_str!("sql/delete_product.sql");
const DECREMENT_INVENTORY_SQL: &str = include_str!("sql/decrement_inventory.sql");

#[automock]
#[async_trait]
pub trait ProductsRepository: Send + Sync {
    /// Page through products matching `query`, ordered by catalog id.
    async fn list_products(
        &self,
        query: &ProductQuery,
        page: Page,
    ) -> Result<Vec<ProductRecord>, sqlx::Error>;

    async fn find_product(&self, product: ProductUuid)
    -> Result<Option<ProductRecord>, sqlx::Error>;

    async fn find_by_slug(&self, slug: &str) -> Result<Option<ProductRecord>, sqlx::Error>;

    async fn find_by_catalog_id(
        &self,
        catalog_id: i64,
    ) -> Result<Option<ProductRecord>, sqlx::Error>;

    async fn create_product(&self, product: &NewProduct) -> Result<ProductRecord, sqlx::Error>;

    /// Replace every field of a product. `None` when the product does not exist.
    async fn update_product(
        &self,
        product: ProductUuid,
        update: &ProductUpdate,
    ) -> Result<Option<ProductRecord>, sqlx::Error>;

    async fn delete_product(
        &self,
        product: ProductUuid,
    ) -> Result<Option<ProductRecord>, sqlx::Error>;

    /// Take `amount` units out of stock. Returns `false`, changing nothing, when stock is short.
    async fn decrement_inventory(
        &self,
        product: ProductUuid,
        amount: u32,
    ) -> Result<bool, sqlx::Error>;
}

#[derive(Debug, Clone)]
pub struct PgProductsRepository {
    db: Db,
}

impl PgProductsRepository {
    #[must_use]
    pub fn new(db: Db) -> Self {
        Self { db }
    }
}

#[async_trait]
impl ProductsRepository for PgProductsRepository {
    async fn list_products(
        &self,
        query: &ProductQuery,
        page: Page,
    ) -> Result<Vec<ProductRecord>, sqlx::Error> {
        query_as::<Postgres, ProductRecord>(LIST_PRODUCTS_SQL)
            .bind(query.search_term().map(escape_like))
            .bind(page.offset())
            .bind(page.row_limit())
            .fetch_all(self.db.pool())
            .await
    }

    async fn find_product(
        &self,
        product: ProductUuid,
    ) -> Result<Option<ProductRecord>, sqlx::Error> {
        query_as::<Postgres, ProductRecord>(FIND_PRODUCT_SQL)
            .bind(product.into_uuid())
            .fetch_optional(self.db.pool())
            .await
    }

    async fn find_by_slug(&self, slug: &str) -> Result<Option<ProductRecord>, sqlx::Error> {
        query_as::<Postgres, ProductRecord>(FIND_PRODUCT_BY_SLUG_SQL)
            .bind(slug)
            .fetch_optional(self.db.pool())
            .await
    }

    async fn find_by_catalog_id(
        &self,
        catalog_id: i64,
    ) -> Result<Option<ProductRecord>, sqlx::Error> {
        query_as::<Postgres, ProductRecord>(FIND_PRODUCT_BY_CATALOG_ID_SQL)
            .bind(catalog_id)
            .fetch_optional(self.db.pool())
            .await
    }

    async fn create_product(&self, product: &NewProduct) -> Result<ProductRecord, sqlx::Error> {
        let mut tx = self.db.begin().await?;

        let created = query_as::<Postgres, ProductRecord>(CREATE_PRODUCT_SQL)
            .bind(product.uuid.into_uuid())
            .bind(product.catalog_id)
            .bind(&product.name)
            .bind(&product.slug)
            .bind(product.description.as_deref())
            .bind(product.price)
            .bind(product.image_url.as_deref())
            .bind(inventory_to_i32(product.inventory)?)
            .bind(product.category.as_deref())
            .bind(product.is_active)
            .fetch_one(&mut *tx)
            .await?;

        tx.commit().await?;

        Ok(created)
    }

    async fn update_product(
        &self,
        product: ProductUuid,
        update: &ProductUpdate,
    ) -> Result<Option<ProductRecord>, sqlx::Error> {
        let mut tx = self.db.begin().await?;

        let updated = query_as::<Postgres, ProductRecord>(UPDATE_PRODUCT_SQL)
            .bind(product.into_uuid())
            .bind(update.catalog_id)
            .bind(&update.name)
            .bind(&update.slug)
            .bind(update.description.as_deref())
            .bind(update.price)
            .bind(update.image_url.as_deref())
            .bind(inventory_to_i32(update.inventory)?)
            .bind(update.category.as_deref())
            .bind(update.is_active)
            .fetch_optional(&mut *tx)
            .await?;

        tx.commit().await?;

        Ok(updated)
    }

    async fn delete_product(
        &self,
        product: ProductUuid,
    ) -> Result<Option<ProductRecord>, sqlx::Error> {
        let mut tx = self.db.begin().await?;

        let deleted = query_as::<Postgres, ProductRecord>(DELETE_PRODUCT_SQL)
            .bind(product.into_uuid())
            .fetch_optional(&mut *tx)
            .await?;

        tx.commit().await?;

        Ok(deleted)
    }

    async fn decrement_inventory(
        &self,
        product: ProductUuid,
        amount: u32,
    ) -> Result<bool, sqlx::Error> {
        let mut tx = self.db.begin().await?;

        let decremented = decrement_inventory(&mut tx, product, amount).await?;

        tx.commit().await?;

        Ok(decremented)
    }
}

/// Guarded stock decrement inside a caller-owned transaction.
pub(crate) async fn decrement_inventory(
    tx: &mut Transaction<'_, Postgres>,
    product: ProductUuid,
    amount: u32,
) -> Result<bool, sqlx::Error> {
    let rows_affected = query(DECREMENT_INVENTORY_SQL)
        .bind(product.into_uuid())
        .bind(inventory_to_i32(amount)?)
        .execute(&mut **tx)
        .await?
        .rows_affected();

    Ok(rows_affected == 1)
}

fn inventory_to_i32(inventory: u32) -> Result<i32, sqlx::Error> {
    i32::try_from(inventory).map_err(|e| sqlx::Error::Encode(Box::new(e)))
}

fn escape_like(term: &str) -> String {
    term.replace('\\', "\\\\")
        .replace('%', "\\%")
        .replace('_', "\\_")
}

impl<'r> FromRow<'r, PgRow> for ProductRecord {
    fn from_row(row: &'r PgRow) -> sqlx::Result<Self> {
        let inventory_i32: i32 = row.try_get("inventory")?;

        let inventory = u32::try_from(inventory_i32).map_err(|e| sqlx::Error::ColumnDecode {
            index: "inventory".to_string(),
            source: Box::new(e),
        })?;

        Ok(Self {
            uuid: ProductUuid::from_uuid(row.try_get("uuid")?),
            catalog_id: row.try_get("catalog_id")?,
            name: row.try_get("name")?,
            slug: row.try_get("slug")?,
            description: row.try_get("description")?,
            price: row.try_get::<Decimal, _>("price")?,
            image_url: row.try_get("image_url")?,
            inventory,
            category: row.try_get("category")?,
            is_active: row.try_get("is_active")?,
            created_at: row.try_get::<SqlxTimestamp, _>("created_at")?.to_jiff(),
            updated_at: row.try_get::<SqlxTimestamp, _>("updated_at")?.to_jiff(),
        })
    }
}
