//! Product Errors

use salvo::http::StatusError;
use tracing::error;

use bazaar_app::domain::products::ProductsServiceError;

pub(crate) fn into_status_error(error: ProductsServiceError) -> StatusError {
    match error {
        ProductsServiceError::DuplicateSlug => {
            StatusError::bad_request().brief("A product with this slug already exists")
        }
        ProductsServiceError::DuplicateCatalogId => {
            StatusError::bad_request().brief("A product with this catalog id already exists")
        }
        ProductsServiceError::InvalidData => {
            StatusError::bad_request().brief("Invalid product payload")
        }
        ProductsServiceError::NotFound => StatusError::not_found().brief("Product not found"),
        ProductsServiceError::Sql(source) => {
            error!("product storage error: {source}");

            StatusError::internal_server_error()
        }
    }
}
