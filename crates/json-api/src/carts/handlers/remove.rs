//! Remove Cart Item Handler

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

/// Remove Cart Item Request
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub(crate) struct RemoveCartItemRequest {
    pub catalog_id: i64,
}

/// Remove Cart Item Handler
#[endpoint(
    tags("cart"),
    summary = "Remove Item from Cart",
    security(("bearer_auth" = [])),
    responses(
        (status_code = StatusCode::OK, description = "Updated cart"),
        (status_code = StatusCode::NOT_FOUND, description = "Product not in cart"),
    ),
)]
#[tracing::instrument(name = "cart.remove", skip(json, depot), err)]
pub(crate) async fn handler(
    json: JsonBody<RemoveCartItemRequest>,
    depot: &mut Depot,
) -> Result<Json<CartResponse>, StatusError> {
    let state = depot.obtain_or_500::<Arc<State>>()?;
    let principal = depot.principal_or_401()?;

    let cart = state
        .app
        .carts
        .remove_item(principal.user, json.into_inner().catalog_id)
        .await
        .map_err(into_status_error)?;

    Ok(Json(cart.into()))
}
