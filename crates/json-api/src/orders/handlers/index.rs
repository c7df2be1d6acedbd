//! Order History Handler

use std::sync::Arc;

use salvo::{oapi::extract::QueryParam, prelude::*};

use bazaar_app::domain::orders::{DEFAULT_ORDERS_LIMIT, MAX_ORDERS_LIMIT};

use crate::{
    extensions::*,
    orders::{OrdersResponse, into_status_error},
    paging::page_from_query,
    state::State,
};

/// Order History Handler
///
/// Lists the caller's orders, newest first.
#[endpoint(
    tags("orders"),
    summary = "List My Orders",
    security(("bearer_auth" = []))
)]
pub(crate) async fn handler(
    skip: QueryParam<String, false>,
    limit: QueryParam<String, false>,
    depot: &mut Depot,
) -> Result<Json<OrdersResponse>, StatusError> {
    let state = depot.obtain_or_500::<Arc<State>>()?;
    let principal = depot.principal_or_401()?;

    let page = page_from_query(
        skip.into_inner(),
        limit.into_inner(),
        DEFAULT_ORDERS_LIMIT,
        MAX_ORDERS_LIMIT,
    )?;

    let orders = state
        .app
        .orders
        .list_orders(principal.user, page)
        .await
        .map_err(into_status_error)?;

    Ok(Json(orders.into()))
}
