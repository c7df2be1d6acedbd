//! Create Product Handler

use std::sync::Arc;

use salvo::{
    http::header::LOCATION,
    oapi::{ToSchema, extract::JsonBody},
    prelude::*,
};
use serde::{Deserialize, Serialize};

use bazaar_app::domain::products::{data::NewProduct, records::ProductUuid};

use crate::{
    extensions::*,
    products::{ProductResponse, errors::into_status_error, parse_price},
    state::State,
};

/// Create Product Request
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub(crate) struct CreateProductRequest {
    pub catalog_id: i64,
    pub name: String,
    pub slug: String,
    #[serde(default)]
    pub description: Option<String>,
    /// Decimal string, e.g. `"25.00"`
    pub price: String,
    #[serde(default)]
    pub image_url: Option<String>,
    #[serde(default)]
    pub inventory: u32,
    #[serde(default)]
    pub category: Option<String>,
    #[serde(default = "active_by_default")]
    pub is_active: bool,
}

fn active_by_default() -> bool {
    true
}

impl CreateProductRequest {
    fn into_new_product(self) -> Result<NewProduct, StatusError> {
        Ok(NewProduct {
            uuid: ProductUuid::new(),
            catalog_id: self.catalog_id,
            name: self.name,
            slug: self.slug,
            description: self.description,
            price: parse_price(&self.price)?,
            image_url: self.image_url,
            inventory: self.inventory,
            category: self.category,
            is_active: self.is_active,
        })
    }
}

/// Create Product Handler
#[endpoint(
    tags("admin"),
    summary = "Create Product",
    security(("bearer_auth" = [])),
    responses(
        (status_code = StatusCode::CREATED, description = "Product created"),
        (status_code = StatusCode::BAD_REQUEST, description = "Duplicate slug or catalog id, or invalid payload"),
        (status_code = StatusCode::FORBIDDEN, description = "Admin role required"),
        (status_code = StatusCode::INTERNAL_SERVER_ERROR, description = "Internal Server Error"),
    ),
)]
#[tracing::instrument(
    name = "products.create",
    skip(json, depot, res),
    fields(catalog_id = tracing::field::Empty, slug = tracing::field::Empty),
    err
)]
pub(crate) async fn handler(
    json: JsonBody<CreateProductRequest>,
    depot: &mut Depot,
    res: &mut Response,
) -> Result<Json<ProductResponse>, StatusError> {
    let state = depot.obtain_or_500::<Arc<State>>()?;
    let product = json.into_inner().into_new_product()?;

    let span = tracing::Span::current();

    span.record("catalog_id", product.catalog_id);
    span.record("slug", tracing::field::display(&product.slug));

    let created = state
        .app
        .products
        .create_product(product)
        .await
        .map_err(into_status_error)?;

    res.add_header(LOCATION, format!("/products/{}", created.slug), true)
        .or_500("failed to set location header")?
        .status_code(StatusCode::CREATED);

    Ok(Json(created.into()))
}
