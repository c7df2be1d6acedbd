//! Create Order Handler

use std::sync::Arc;

use salvo::{http::header::LOCATION, prelude::*};

use crate::{
    checkout::errors::into_status_error, extensions::*, observability, orders::OrderResponse,
    state::State,
};

/// Create Order Handler
///
/// Turns the caller's cart into a pending order priced from the current catalog, then empties
/// the cart.
#[endpoint(
    tags("checkout"),
    summary = "Create Order From Cart",
    security(("bearer_auth" = [])),
    responses(
        (status_code = StatusCode::CREATED, description = "Pending order created"),
        (status_code = StatusCode::BAD_REQUEST, description = "Cart is empty or has unavailable products"),
        (status_code = StatusCode::INTERNAL_SERVER_ERROR, description = "Internal Server Error"),
    ),
)]
#[tracing::instrument(
    name = "checkout.create_order",
    skip(depot, res),
    fields(user_uuid = tracing::field::Empty, order_uuid = tracing::field::Empty),
    err
)]
pub(crate) async fn handler(
    depot: &mut Depot,
    res: &mut Response,
) -> Result<Json<OrderResponse>, StatusError> {
    let state = depot.obtain_or_500::<Arc<State>>()?;
    let principal = depot.principal_or_401()?;

    let span = tracing::Span::current();

    span.record("user_uuid", tracing::field::display(principal.user));

    let order = state
        .app
        .checkout
        .create_order_from_cart(principal.user)
        .await
        .map_err(into_status_error)?;

    span.record("order_uuid", tracing::field::display(order.uuid));

    observability::record_order_created();

    res.add_header(LOCATION, format!("/orders/{}", order.uuid), true)
        .or_500("failed to set location header")?
        .status_code(StatusCode::CREATED);

    Ok(Json(order.into()))
}
