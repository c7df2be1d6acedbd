//! Product Index Handler

use std::sync::Arc;

use salvo::{
    oapi::{ToSchema, extract::QueryParam},
    prelude::*,
};
use serde::{Deserialize, Serialize};

use bazaar_app::domain::products::{DEFAULT_PRODUCTS_LIMIT, MAX_PRODUCTS_LIMIT, data::ProductQuery};

use crate::{
    extensions::*,
    paging::page_from_query,
    products::{ProductResponse, errors::into_status_error},
    state::State,
};

#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub(crate) struct ProductsResponse {
    /// The list of products
    pub products: Vec<ProductResponse>,
}

/// Product Index Handler
///
/// Lists the catalog, optionally filtered by a name or category search term.
#[endpoint(tags("products"), summary = "List Products")]
pub(crate) async fn handler(
    q: QueryParam<String, false>,
    skip: QueryParam<String, false>,
    limit: QueryParam<String, false>,
    depot: &mut Depot,
) -> Result<Json<ProductsResponse>, StatusError> {
    let state = depot.obtain_or_500::<Arc<State>>()?;

    let term = q.into_inner();
    let query = ProductQuery::from_search(term.as_deref());
    let page = page_from_query(
        skip.into_inner(),
        limit.into_inner(),
        DEFAULT_PRODUCTS_LIMIT,
        MAX_PRODUCTS_LIMIT,
    )?;

    let products = state
        .app
        .products
        .list_products(query, page)
        .await
        .map_err(into_status_error)?;

    Ok(Json(ProductsResponse {
        products: products.into_iter().map(Into::into).collect(),
    }))
}
