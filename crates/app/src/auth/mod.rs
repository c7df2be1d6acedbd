//! Authentication

pub mod data;
mod errors;
pub mod password;
pub mod records;
pub mod repository;
mod service;
mod token;

pub use errors::*;
pub use records::{IssuedSession, Principal, Role, SessionUuid, UserRecord, UserUuid};
pub use service::*;
pub use token::*;
