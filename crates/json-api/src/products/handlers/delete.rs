//! Delete Product Handler

use std::sync::Arc;

use salvo::{oapi::extract::PathParam, prelude::*};
use uuid::Uuid;

use bazaar_app::domain::products::records::ProductUuid;

use crate::{
    extensions::*,
    products::{ProductResponse, errors::into_status_error},
    state::State,
};

/// Delete Product Handler
///
/// Returns the product that was removed.
#[endpoint(
    tags("admin"),
    summary = "Delete Product",
    security(("bearer_auth" = [])),
    responses(
        (status_code = StatusCode::OK, description = "Product deleted"),
        (status_code = StatusCode::NOT_FOUND, description = "Product not found"),
        (status_code = StatusCode::BAD_REQUEST, description = "Bad Request"),
        (status_code = StatusCode::INTERNAL_SERVER_ERROR, description = "Internal Server Error"),
    ),
)]
#[tracing::instrument(name = "products.delete", skip(uuid, depot), err)]
pub(crate) async fn handler(
    uuid: PathParam<Uuid>,
    depot: &mut Depot,
) -> Result<Json<ProductResponse>, StatusError> {
    let state = depot.obtain_or_500::<Arc<State>>()?;

    let deleted = state
        .app
        .products
        .delete_product(ProductUuid::from_uuid(uuid.into_inner()))
        .await
        .map_err(into_status_error)?;

    Ok(Json(deleted.into()))
}
