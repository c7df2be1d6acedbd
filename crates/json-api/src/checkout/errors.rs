//! Checkout Errors

use salvo::http::StatusError;
use tracing::error;

use bazaar_app::domain::checkout::CheckoutServiceError;

pub(crate) fn into_status_error(error: CheckoutServiceError) -> StatusError {
    match error {
        CheckoutServiceError::EmptyCart => StatusError::bad_request().brief("Cart is empty"),
        CheckoutServiceError::ItemUnavailable { catalog_id } => StatusError::bad_request()
            .brief(format!("Product {catalog_id} is no longer available")),
        CheckoutServiceError::Sql(source) => {
            error!("checkout storage error: {source}");

            StatusError::internal_server_error()
        }
    }
}
