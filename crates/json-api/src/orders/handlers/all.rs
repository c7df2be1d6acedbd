//! Admin Order Listing Handler

use std::sync::Arc;

use salvo::{oapi::extract::QueryParam, prelude::*};

use bazaar_app::domain::orders::{DEFAULT_ADMIN_ORDERS_LIMIT, MAX_ADMIN_ORDERS_LIMIT};

use crate::{
    extensions::*,
    orders::{OrdersResponse, into_status_error},
    paging::page_from_query,
    state::State,
};

/// Admin Order Listing Handler
///
/// Lists every user's orders, newest first.
#[endpoint(
    tags("admin"),
    summary = "List All Orders",
    security(("bearer_auth" = [])),
    responses(
        (status_code = StatusCode::OK, description = "Orders"),
        (status_code = StatusCode::FORBIDDEN, description = "Admin role required"),
    ),
)]
pub(crate) async fn handler(
    skip: QueryParam<String, false>,
    limit: QueryParam<String, false>,
    depot: &mut Depot,
) -> Result<Json<OrdersResponse>, StatusError> {
    let state = depot.obtain_or_500::<Arc<State>>()?;

    let page = page_from_query(
        skip.into_inner(),
        limit.into_inner(),
        DEFAULT_ADMIN_ORDERS_LIMIT,
        MAX_ADMIN_ORDERS_LIMIT,
    )?;

    let orders = state
        .app
        .orders
        .list_all_orders(page)
        .await
        .map_err(into_status_error)?;

    Ok(Json(orders.into()))
}
