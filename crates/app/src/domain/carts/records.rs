//! Cart Records

use jiff::Timestamp;
use serde::{Deserialize, Serialize};

use crate::auth::UserUuid;

/// Cart Record
///
/// Each user owns at most one cart; items keep the order they were first added in.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CartRecord {
    pub owner: UserUuid,
    pub items: Vec<CartItemRecord>,
    pub updated_at: Timestamp,
}

impl CartRecord {
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }
}

/// Cart Item Record
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CartItemRecord {
    pub catalog_id: i64,
    pub quantity: u32,
}
