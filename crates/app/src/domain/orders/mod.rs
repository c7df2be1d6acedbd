//! Orders

pub mod data;
pub mod errors;
pub mod records;
pub mod repository;
pub mod service;

pub use errors::OrdersServiceError;
pub use service::*;

/// Order history page size when none is requested.
pub const DEFAULT_ORDERS_LIMIT: u32 = 20;

/// Largest order history page a user may request.
pub const MAX_ORDERS_LIMIT: u32 = 100;

/// Admin order listing page size when none is requested.
pub const DEFAULT_ADMIN_ORDERS_LIMIT: u32 = 50;

/// Largest admin order listing page.
pub const MAX_ADMIN_ORDERS_LIMIT: u32 = 200;

/// Currency recorded on every order.
pub const ORDER_CURRENCY: &str = "usd";
