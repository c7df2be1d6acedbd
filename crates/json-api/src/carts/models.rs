//! Cart request and response bodies.

use salvo::oapi::ToSchema;
use serde::{Deserialize, Serialize};

use bazaar_app::domain::carts::records::{CartItemRecord, CartRecord};

/// Cart Response
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub(crate) struct CartResponse {
    /// Lines in the order they were first added
    pub items: Vec<CartItemResponse>,

    /// The date and time the cart was last changed
    pub updated_at: String,
}

impl From<CartRecord> for CartResponse {
    fn from(cart: CartRecord) -> Self {
        Self {
            items: cart.items.into_iter().map(Into::into).collect(),
            updated_at: cart.updated_at.to_string(),
        }
    }
}

/// Cart Item Response
#[derive(Debug, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub(crate) struct CartItemResponse {
    pub catalog_id: i64,
    pub quantity: u32,
}

impl From<CartItemRecord> for CartItemResponse {
    fn from(item: CartItemRecord) -> Self {
        Self {
            catalog_id: item.catalog_id,
            quantity: item.quantity,
        }
    }
}
