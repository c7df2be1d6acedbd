//! Cart Errors

use salvo::http::StatusError;
use tracing::error;

use bazaar_app::domain::carts::CartsServiceError;

pub(crate) fn into_status_error(error: CartsServiceError) -> StatusError {
    match error {
        CartsServiceError::InvalidQuantity => {
            StatusError::bad_request().brief("Quantity must be greater than zero")
        }
        CartsServiceError::ProductNotFound => StatusError::not_found().brief("Product not found"),
        CartsServiceError::Sql(source) => {
            error!("cart storage error: {source}");

            StatusError::internal_server_error()
        }
    }
}
