//! Payments Repository

use async_trait::async_trait;
use mockall::automock;
use tracing::debug;

use crate::{
    database::Db,
    domain::{
        orders::{
            records::{OrderRecord, OrderStatus},
            repository::transition_order,
        },
        products::{records::ProductUuid, repository::decrement_inventory},
    },
};

/// Outcome of settling a pending order.
#[derive(Debug, Clone, PartialEq)]
pub enum Settlement {
    /// Stock was taken for every line and the order is now paid.
    Paid(OrderRecord),

    /// Another confirmation moved the order out of `pending` first. Nothing was written.
    AlreadySettled,

    /// A guarded decrement found too little stock. Nothing was written.
    OutOfStock { product: ProductUuid, requested: u32 },
}

#[automock]
#[async_trait]
pub trait PaymentsRepository: Send + Sync {
    /// Decrement stock for every line and mark the order paid, atomically.
    async fn settle(&self, order: &OrderRecord) -> Result<Settlement, sqlx::Error>;
}

#[derive(Debug, Clone)]
pub struct PgPaymentsRepository {
    db: Db,
}

impl PgPaymentsRepository {
    #[must_use]
    pub fn new(db: Db) -> Self {
        Self { db }
    }
}

#[async_trait]
impl PaymentsRepository for PgPaymentsRepository {
    async fn settle(&self, order: &OrderRecord) -> Result<Settlement, sqlx::Error> {
        let mut tx = self.db.begin().await?;

        for line in &order.lines {
            if !decrement_inventory(&mut tx, line.product_ref, line.quantity).await? {
                tx.rollback().await?;

                debug!(order = %order.uuid, product = %line.product_ref, "settlement rolled back");

                return Ok(Settlement::OutOfStock {
                    product: line.product_ref,
                    requested: line.quantity,
                });
            }
        }

        match transition_order(&mut tx, order.uuid, OrderStatus::Paid).await? {
            Some(paid) => {
                tx.commit().await?;

                Ok(Settlement::Paid(paid))
            }
            None => {
                tx.rollback().await?;

                Ok(Settlement::AlreadySettled)
            }
        }
    }
}
