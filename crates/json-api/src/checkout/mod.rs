//! Checkout

mod errors;
pub(crate) mod create_order;
