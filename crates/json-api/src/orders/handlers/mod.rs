//! Order Handlers

pub(crate) mod all;
pub(crate) mod get;
pub(crate) mod index;
