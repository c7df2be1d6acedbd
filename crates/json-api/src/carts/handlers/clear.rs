//! Clear Cart Handler

use std::sync::Arc;

use salvo::prelude::*;

use crate::{
    carts::{CartResponse, errors::into_status_error},
    extensions::*,
    state::State,
};

/// Clear Cart Handler
///
/// Removes every line; the cart itself is kept.
#[endpoint(
    tags("cart"),
    summary = "Clear Cart",
    security(("bearer_auth" = []))
)]
#[tracing::instrument(name = "cart.clear", skip(depot), err)]
pub(crate) async fn handler(depot: &mut Depot) -> Result<Json<CartResponse>, StatusError> {
    let state = depot.obtain_or_500::<Arc<State>>()?;
    let principal = depot.principal_or_401()?;

    let cart = state
        .app
        .carts
        .clear_cart(principal.user)
        .await
        .map_err(into_status_error)?;

    Ok(Json(cart.into()))
}
