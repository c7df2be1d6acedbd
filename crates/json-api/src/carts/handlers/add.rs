//! Add Cart Item Handler

use std::sync::Arc;

use salvo::{
    oapi::{ToSchema, extract::JsonBody},
    prelude::*,
};
use serde::{Deserialize, Serialize};

use crate::{
    carts::{CartResponse, errors::into_status_error},
    extensions::*,
    state::State,
};

/// Add Cart Item Request
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub(crate) struct AddCartItemRequest {
    pub catalog_id: i64,
    #[serde(default = "one")]
    pub quantity: i64,
}

fn one() -> i64 {
    1
}

/// Add Cart Item Handler
///
/// Adds units of an active product; quantities accumulate on an existing line.
#[endpoint(
    tags("cart"),
    summary = "Add Item to Cart",
    security(("bearer_auth" = [])),
    responses(
        (status_code = StatusCode::OK, description = "Updated cart"),
        (status_code = StatusCode::BAD_REQUEST, description = "Quantity must be positive"),
        (status_code = StatusCode::NOT_FOUND, description = "Product not found"),
        (status_code = StatusCode::INTERNAL_SERVER_ERROR, description = "Internal Server Error"),
    ),
)]
#[tracing::instrument(
    name = "cart.add",
    skip(json, depot),
    fields(user_uuid = tracing::field::Empty, catalog_id = tracing::field::Empty),
    err
)]
pub(crate) async fn handler(
    json: JsonBody<AddCartItemRequest>,
    depot: &mut Depot,
) -> Result<Json<CartResponse>, StatusError> {
    let state = depot.obtain_or_500::<Arc<State>>()?;
    let principal = depot.principal_or_401()?;
    let request = json.into_inner();

    let span = tracing::Span::current();

    span.record("user_uuid", tracing::field::display(principal.user));
    span.record("catalog_id", request.catalog_id);

    let cart = state
        .app
        .carts
        .add_item(principal.user, request.catalog_id, request.quantity)
        .await
        .map_err(into_status_error)?;

    Ok(Json(cart.into()))
}
