//! Payment Errors

use salvo::http::StatusError;
use tracing::error;

use bazaar_app::domain::payments::PaymentsServiceError;

pub(crate) fn into_status_error(error: PaymentsServiceError) -> StatusError {
    match error {
        PaymentsServiceError::OrderNotFound => StatusError::not_found().brief("Order not found"),
        PaymentsServiceError::InsufficientInventory {
            name,
            requested,
            available,
            ..
        } => StatusError::bad_request().brief(format!(
            "Insufficient inventory for {name}: requested {requested}, available {available}"
        )),
        PaymentsServiceError::Sql(source) => {
            error!("payment storage error: {source}");

            StatusError::internal_server_error()
        }
    }
}
