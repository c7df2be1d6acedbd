//! Update Product Handler

use std::sync::Arc;

use salvo::{
    oapi::{
        ToSchema,
        extract::{JsonBody, PathParam},
    },
    prelude::*,
};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use bazaar_app::domain::products::{
    data::ProductUpdate,
    records::{ProductRecord, ProductUuid},
};

use crate::{
    extensions::*,
    products::{ProductResponse, errors::into_status_error, parse_price},
    state::State,
};

/// Update Product Request
///
/// Omitted fields keep their stored values.
#[derive(Debug, Default, Serialize, Deserialize, ToSchema)]
pub(crate) struct UpdateProductRequest {
    pub catalog_id: Option<i64>,
    pub name: Option<String>,
    pub slug: Option<String>,
    pub description: Option<String>,
    /// Decimal string, e.g. `"25.00"`
    pub price: Option<String>,
    pub image_url: Option<String>,
    pub inventory: Option<u32>,
    pub category: Option<String>,
    pub is_active: Option<bool>,
}

impl UpdateProductRequest {
    fn merge_into(self, existing: ProductRecord) -> Result<ProductUpdate, StatusError> {
        let price = match self.price {
            Some(price) => parse_price(&price)?,
            None => existing.price,
        };

        Ok(ProductUpdate {
            catalog_id: self.catalog_id.unwrap_or(existing.catalog_id),
            name: self.name.unwrap_or(existing.name),
            slug: self.slug.unwrap_or(existing.slug),
            description: self.description.or(existing.description),
            price,
            image_url: self.image_url.or(existing.image_url),
            inventory: self.inventory.unwrap_or(existing.inventory),
            category: self.category.or(existing.category),
            is_active: self.is_active.unwrap_or(existing.is_active),
        })
    }
}

/// Product Update Handler
#[endpoint(
    tags("admin"),
    summary = "Update Product",
    security(("bearer_auth" = [])),
    responses(
        (status_code = StatusCode::OK, description = "Product updated"),
        (status_code = StatusCode::NOT_FOUND, description = "Product not found"),
        (status_code = StatusCode::BAD_REQUEST, description = "Duplicate slug or catalog id, or invalid payload"),
        (status_code = StatusCode::INTERNAL_SERVER_ERROR, description = "Internal Server Error"),
    ),
)]
#[tracing::instrument(
    name = "products.update",
    skip(uuid, json, depot),
    fields(product_uuid = tracing::field::Empty),
    err
)]
pub(crate) async fn handler(
    uuid: PathParam<Uuid>,
    json: JsonBody<UpdateProductRequest>,
    depot: &mut Depot,
) -> Result<Json<ProductResponse>, StatusError> {
    let state = depot.obtain_or_500::<Arc<State>>()?;
    let product = ProductUuid::from_uuid(uuid.into_inner());

    tracing::Span::current().record("product_uuid", tracing::field::display(product));

    let existing = state
        .app
        .products
        .get_product(product)
        .await
        .map_err(into_status_error)?;

    let update = json.into_inner().merge_into(existing)?;

    let updated = state
        .app
        .products
        .update_product(product, update)
        .await
        .map_err(into_status_error)?;

    Ok(Json(updated.into()))
}
