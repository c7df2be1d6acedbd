//! Payments service errors.

use thiserror::Error;

use crate::domain::products::records::ProductUuid;

#[derive(Debug, Error)]
pub enum PaymentsServiceError {
    #[error("order not found")]
    OrderNotFound,

    #[error("insufficient inventory for {name}: requested {requested}, available {available}")]
    InsufficientInventory {
        product: ProductUuid,
        name: String,
        requested: u32,
        available: u32,
    },

    #[error("storage error")]
    Sql(#[from] sqlx::Error),
}
