//! Get Product Handler

use std::sync::Arc;

use salvo::{oapi::extract::PathParam, prelude::*};

use crate::{
    extensions::*,
    products::{ProductResponse, errors::into_status_error},
    state::State,
};

/// Get Product Handler
///
/// Returns an active product by its slug.
#[endpoint(
    tags("products"),
    summary = "Get Product",
    responses(
        (status_code = StatusCode::OK, description = "Product"),
        (status_code = StatusCode::NOT_FOUND, description = "Product not found"),
    ),
)]
pub(crate) async fn handler(
    slug: PathParam<String>,
    depot: &mut Depot,
) -> Result<Json<ProductResponse>, StatusError> {
    let state = depot.obtain_or_500::<Arc<State>>()?;

    let product = state
        .app
        .products
        .get_product_by_slug(&slug.into_inner())
        .await
        .map_err(into_status_error)?;

    Ok(Json(product.into()))
}
