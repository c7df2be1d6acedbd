//! Auth Data

use crate::auth::{
    SessionTokenVersion,
    records::{Role, SessionUuid, UserUuid},
};

/// New User Data
#[derive(Debug, Clone, PartialEq)]
pub struct NewUser {
    pub uuid: UserUuid,
    pub email: String,
    pub password_hash: String,
    pub role: Role,
}

/// New Session Data
#[derive(Debug, Clone, PartialEq)]
pub struct NewSession {
    pub uuid: SessionUuid,
    pub user: UserUuid,
    pub version: SessionTokenVersion,
    pub token_hash: String,
    pub ttl_minutes: u32,
}
