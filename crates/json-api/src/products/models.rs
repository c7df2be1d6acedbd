//! Product request and response bodies.

use std::str::FromStr;

use rust_decimal::Decimal;
use salvo::{http::StatusError, oapi::ToSchema};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use bazaar_app::domain::products::records::ProductRecord;

use crate::extensions::*;

/// Product Response
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub(crate) struct ProductResponse {
    /// The unique identifier of the product
    pub uuid: Uuid,

    /// Public catalog number
    pub catalog_id: i64,

    pub name: String,

    pub slug: String,

    pub description: Option<String>,

    /// Unit price as a decimal string, e.g. `"25.00"`
    pub price: String,

    pub image_url: Option<String>,

    /// Units in stock
    pub inventory: u32,

    pub category: Option<String>,

    pub is_active: bool,

    /// The date and time the product was created
    pub created_at: String,

    /// The date and time the product was last updated
    pub updated_at: String,
}

impl From<ProductRecord> for ProductResponse {
    fn from(product: ProductRecord) -> Self {
        Self {
            uuid: product.uuid.into_uuid(),
            catalog_id: product.catalog_id,
            name: product.name,
            slug: product.slug,
            description: product.description,
            price: product.price.to_string(),
            image_url: product.image_url,
            inventory: product.inventory,
            category: product.category,
            is_active: product.is_active,
            created_at: product.created_at.to_string(),
            updated_at: product.updated_at.to_string(),
        }
    }
}

/// Parse a decimal price string from a request body.
pub(crate) fn parse_price(price: &str) -> Result<Decimal, StatusError> {
    Decimal::from_str(price.trim()).or_400("Price must be a decimal number")
}
