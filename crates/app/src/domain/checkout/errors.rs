//! Checkout service errors.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum CheckoutServiceError {
    #[error("cart is empty")]
    EmptyCart,

    #[error("product {catalog_id} is unavailable")]
    ItemUnavailable { catalog_id: i64 },

    #[error("storage error")]
    Sql(#[from] sqlx::Error),
}
