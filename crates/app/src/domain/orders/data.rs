//! Orders Data

use rust_decimal::Decimal;

use crate::{
    auth::UserUuid,
    domain::orders::records::{OrderLineRecord, OrderUuid},
};

/// New Order Data
///
/// Always persisted as `pending`.
#[derive(Debug, Clone, PartialEq)]
pub struct NewOrder {
    pub uuid: OrderUuid,
    pub owner: UserUuid,
    pub lines: Vec<OrderLineRecord>,
    pub total: Decimal,
    pub currency: String,
}
