//! Payments

pub mod errors;
pub mod records;
pub mod repository;
pub mod service;

pub use errors::PaymentsServiceError;
pub use service::*;
