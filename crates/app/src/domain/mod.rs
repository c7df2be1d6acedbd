//! Bazaar Domain Concerns

pub mod carts;
pub mod checkout;
pub mod orders;
pub mod paging;
pub mod payments;
pub mod products;
