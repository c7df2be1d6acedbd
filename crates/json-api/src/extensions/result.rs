//! Result helpers for handlers.

use std::fmt::Display;

use salvo::prelude::StatusError;
use tracing::{debug, error};

pub(crate) trait ResultExt<T> {
    /// Log the failure and answer with a bare 500.
    fn or_500(self, context: &str) -> Result<T, StatusError>;

    /// Reject client input with a 400 carrying `brief`.
    fn or_400(self, brief: &str) -> Result<T, StatusError>;
}

impl<T, E> ResultExt<T> for Result<T, E>
where
    E: Display,
{
    fn or_500(self, context: &str) -> Result<T, StatusError> {
        self.map_err(|error| {
            error!("{context}: {error}");

            StatusError::internal_server_error()
        })
    }

    fn or_400(self, brief: &str) -> Result<T, StatusError> {
        self.map_err(|error| {
            debug!("rejected input ({brief}): {error}");

            StatusError::bad_request().brief(brief)
        })
    }
}
