//! Order Records

use std::{fmt, str::FromStr};

use jiff::Timestamp;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::{auth::UserUuid, domain::products::records::ProductUuid, uuids::TypedUuid};

/// Order UUID
pub type OrderUuid = TypedUuid<OrderRecord>;

/// Order lifecycle status.
///
/// Orders start `Pending` and move exactly once to one of the terminal states.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OrderStatus {
    Pending,
    Paid,
    Canceled,
    Failed,
}

impl OrderStatus {
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Pending => "pending",
            Self::Paid => "paid",
            Self::Canceled => "canceled",
            Self::Failed => "failed",
        }
    }

    #[must_use]
    pub const fn is_terminal(self) -> bool {
        !matches!(self, Self::Pending)
    }
}

impl fmt::Display for OrderStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Error)]
#[error("unknown order status `{0}`")]
pub struct UnknownOrderStatus(pub String);

impl FromStr for OrderStatus {
    type Err = UnknownOrderStatus;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value {
            "pending" => Ok(Self::Pending),
            "paid" => Ok(Self::Paid),
            "canceled" => Ok(Self::Canceled),
            "failed" => Ok(Self::Failed),
            other => Err(UnknownOrderStatus(other.to_string())),
        }
    }
}

/// Order Line Record
///
/// Name and price are copied from the catalog when the order is placed.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OrderLineRecord {
    pub product_ref: ProductUuid,
    pub catalog_id: i64,
    pub name: String,
    pub unit_price: Decimal,
    pub quantity: u32,
    pub line_total: Decimal,
}

/// Order Record
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OrderRecord {
    pub uuid: OrderUuid,
    pub owner: UserUuid,
    pub lines: Vec<OrderLineRecord>,
    pub total: Decimal,
    pub currency: String,
    pub status: OrderStatus,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn only_pending_is_non_terminal() {
        assert!(!OrderStatus::Pending.is_terminal());
        assert!(OrderStatus::Paid.is_terminal());
        assert!(OrderStatus::Canceled.is_terminal());
        assert!(OrderStatus::Failed.is_terminal());
    }

    #[test]
    fn status_parses_its_own_text() -> Result<(), UnknownOrderStatus> {
        for status in [
            OrderStatus::Pending,
            OrderStatus::Paid,
            OrderStatus::Canceled,
            OrderStatus::Failed,
        ] {
            assert_eq!(status.as_str().parse::<OrderStatus>()?, status);
        }

        Ok(())
    }

    #[test]
    fn unknown_status_is_rejected() {
        assert!("refunded".parse::<OrderStatus>().is_err());
    }
}
