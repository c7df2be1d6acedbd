//! Cart Repositories

use async_trait::async_trait;
use mockall::automock;
use sqlx::{Postgres, Transaction};

use crate::{auth::UserUuid, database::Db, domain::carts::records::CartRecord};

mod carts;
mod items;

pub(crate) use items::delete_ordered_cart_items;

#[automock]
#[async_trait]
pub trait CartsRepository: Send + Sync {
    /// Load a user's cart, creating an empty one on first access.
    async fn get_cart(&self, owner: UserUuid) -> Result<CartRecord, sqlx::Error>;

    /// Add `quantity` of a product, merging into an existing line. `None` when the merged
    /// quantity would overflow the line.
    async fn add_item(
        &self,
        owner: UserUuid,
        catalog_id: i64,
        quantity: u32,
    ) -> Result<Option<CartRecord>, sqlx::Error>;

    /// Remove a line. `None` when the cart holds no such line.
    async fn remove_item(
        &self,
        owner: UserUuid,
        catalog_id: i64,
    ) -> Result<Option<CartRecord>, sqlx::Error>;

    /// Empty the cart while keeping it.
    async fn clear_cart(&self, owner: UserUuid) -> Result<CartRecord, sqlx::Error>;
}

#[derive(Debug, Clone)]
pub struct PgCartsRepository {
    db: Db,
}

impl PgCartsRepository {
    #[must_use]
    pub fn new(db: Db) -> Self {
        Self { db }
    }
}

async fn load_cart(
    tx: &mut Transaction<'_, Postgres>,
    header: carts::CartRow,
) -> Result<CartRecord, sqlx::Error> {
    let items = items::get_cart_items(tx, header.owner).await?;

    Ok(CartRecord {
        owner: header.owner,
        items,
        updated_at: header.updated_at,
    })
}

#[async_trait]
impl CartsRepository for PgCartsRepository {
    async fn get_cart(&self, owner: UserUuid) -> Result<CartRecord, sqlx::Error> {
        let mut tx = self.db.begin().await?;

        let header = carts::ensure_cart(&mut tx, owner).await?;
        let cart = load_cart(&mut tx, header).await?;

        tx.commit().await?;

        Ok(cart)
    }

    async fn add_item(
        &self,
        owner: UserUuid,
        catalog_id: i64,
        quantity: u32,
    ) -> Result<Option<CartRecord>, sqlx::Error> {
        let mut tx = self.db.begin().await?;

        let header = carts::touch_cart(&mut tx, owner).await?;

        if !items::upsert_cart_item(&mut tx, owner, catalog_id, quantity).await? {
            tx.rollback().await?;

            return Ok(None);
        }

        let cart = load_cart(&mut tx, header).await?;

        tx.commit().await?;

        Ok(Some(cart))
    }

    async fn remove_item(
        &self,
        owner: UserUuid,
        catalog_id: i64,
    ) -> Result<Option<CartRecord>, sqlx::Error> {
        let mut tx = self.db.begin().await?;

        let header = carts::ensure_cart(&mut tx, owner).await?;

        if items::delete_cart_item(&mut tx, owner, catalog_id).await? == 0 {
            return Ok(None);
        }

        let header = carts::touch_cart(&mut tx, header.owner).await?;
        let cart = load_cart(&mut tx, header).await?;

        tx.commit().await?;

        Ok(Some(cart))
    }

    async fn clear_cart(&self, owner: UserUuid) -> Result<CartRecord, sqlx::Error> {
        let mut tx = self.db.begin().await?;

        let header = carts::touch_cart(&mut tx, owner).await?;

        items::clear_cart_items(&mut tx, owner).await?;

        let cart = load_cart(&mut tx, header).await?;

        tx.commit().await?;

        Ok(cart)
    }
}
