//! Get Order Handler

use std::sync::Arc;

use salvo::{oapi::extract::PathParam, prelude::*};
use uuid::Uuid;

use bazaar_app::domain::orders::records::OrderUuid;

use crate::{
    extensions::*,
    orders::{OrderResponse, into_status_error},
    state::State,
};

/// Get Order Handler
///
/// Returns one of the caller's orders.
#[endpoint(
    tags("orders"),
    summary = "Get Order",
    security(("bearer_auth" = [])),
    responses(
        (status_code = StatusCode::OK, description = "Order"),
        (status_code = StatusCode::FORBIDDEN, description = "Order belongs to another user"),
        (status_code = StatusCode::NOT_FOUND, description = "Order not found"),
    ),
)]
pub(crate) async fn handler(
    uuid: PathParam<Uuid>,
    depot: &mut Depot,
) -> Result<Json<OrderResponse>, StatusError> {
    let state = depot.obtain_or_500::<Arc<State>>()?;
    let principal = depot.principal_or_401()?;

    let order = state
        .app
        .orders
        .get_order(principal.user, OrderUuid::from_uuid(uuid.into_inner()))
        .await
        .map_err(into_status_error)?;

    Ok(Json(order.into()))
}
