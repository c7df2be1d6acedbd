//! Products

pub mod data;
pub mod errors;
pub(crate) mod keys;
pub mod records;
pub mod repository;
pub mod service;

pub use errors::ProductsServiceError;
pub use service::*;

/// Catalog page size when none is requested.
pub const DEFAULT_PRODUCTS_LIMIT: u32 = 20;

/// Largest catalog page a caller may request.
pub const MAX_PRODUCTS_LIMIT: u32 = 100;
