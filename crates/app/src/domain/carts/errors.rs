//! Carts service errors.

use sqlx::{Error, error::ErrorKind};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum CartsServiceError {
    #[error("quantity must be greater than zero")]
    InvalidQuantity,

    #[error("product not found")]
    ProductNotFound,

    #[error("storage error")]
    Sql(#[source] Error),
}

impl From<Error> for CartsServiceError {
    fn from(error: Error) -> Self {
        match error.as_database_error().map(|db| db.kind()) {
            Some(ErrorKind::CheckViolation) => Self::InvalidQuantity,
            _ => Self::Sql(error),
        }
    }
}
