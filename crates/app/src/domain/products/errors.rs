//! Products service errors.

use sqlx::{Error, error::ErrorKind};
use thiserror::Error;

/// Unique index guarding product slugs.
pub(crate) const SLUG_CONSTRAINT: &str = "products_slug_key";

#[derive(Debug, Error)]
pub enum ProductsServiceError {
    #[error("a product with this slug already exists")]
    DuplicateSlug,

    #[error("a product with this catalog id already exists")]
    DuplicateCatalogId,

    #[error("product not found")]
    NotFound,

    #[error("invalid data")]
    InvalidData,

    #[error("storage error")]
    Sql(#[source] Error),
}

impl From<Error> for ProductsServiceError {
    fn from(error: Error) -> Self {
        if matches!(error, Error::RowNotFound) {
            return Self::NotFound;
        }

        let Some((kind, slug_conflict)) = error
            .as_database_error()
            .map(|db| (db.kind(), db.constraint() == Some(SLUG_CONSTRAINT)))
        else {
            return Self::Sql(error);
        };

        match kind {
            ErrorKind::UniqueViolation if slug_conflict => Self::DuplicateSlug,
            ErrorKind::UniqueViolation => Self::DuplicateCatalogId,
            ErrorKind::NotNullViolation | ErrorKind::CheckViolation => Self::InvalidData,
            ErrorKind::ForeignKeyViolation | ErrorKind::Other | _ => Self::Sql(error),
        }
    }
}
