//! Order response bodies.

use salvo::oapi::ToSchema;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use bazaar_app::domain::orders::records::{OrderLineRecord, OrderRecord};

/// Order Response
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub(crate) struct OrderResponse {
    /// The unique identifier of the order
    pub uuid: Uuid,

    /// The user who placed the order
    pub owner: Uuid,

    /// Snapshot of the cart at checkout
    pub lines: Vec<OrderLineResponse>,

    /// Decimal string
    pub total: String,

    pub currency: String,

    /// `pending`, `paid`, `canceled` or `failed`
    pub status: String,

    /// The date and time the order was placed
    pub created_at: String,

    /// The date and time the order last changed status
    pub updated_at: String,
}

impl From<OrderRecord> for OrderResponse {
    fn from(order: OrderRecord) -> Self {
        Self {
            uuid: order.uuid.into_uuid(),
            owner: order.owner.into_uuid(),
            lines: order.lines.into_iter().map(Into::into).collect(),
            total: order.total.to_string(),
            currency: order.currency,
            status: order.status.to_string(),
            created_at: order.created_at.to_string(),
            updated_at: order.updated_at.to_string(),
        }
    }
}

/// Order Line Response
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub(crate) struct OrderLineResponse {
    pub product_uuid: Uuid,
    pub catalog_id: i64,
    /// Product name at checkout
    pub name: String,
    /// Decimal string
    pub unit_price: String,
    pub quantity: u32,
    /// Decimal string
    pub line_total: String,
}

impl From<OrderLineRecord> for OrderLineResponse {
    fn from(line: OrderLineRecord) -> Self {
        Self {
            product_uuid: line.product_ref.into_uuid(),
            catalog_id: line.catalog_id,
            name: line.name,
            unit_price: line.unit_price.to_string(),
            quantity: line.quantity,
            line_total: line.line_total.to_string(),
        }
    }
}

#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub(crate) struct OrdersResponse {
    /// Newest first
    pub orders: Vec<OrderResponse>,
}

impl From<Vec<OrderRecord>> for OrdersResponse {
    fn from(orders: Vec<OrderRecord>) -> Self {
        Self {
            orders: orders.into_iter().map(Into::into).collect(),
        }
    }
}
