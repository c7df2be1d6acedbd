//! Payments

mod errors;
pub(crate) mod confirm;
