//! Auth Handlers

pub(crate) mod login;
pub(crate) mod logout;
pub(crate) mod me;
pub(crate) mod promote;
pub(crate) mod signup;
