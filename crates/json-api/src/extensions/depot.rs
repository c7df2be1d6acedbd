//! Depot helper extensions.

use std::any::Any;

use salvo::prelude::{Depot, StatusError};

use bazaar_app::auth::Principal;

/// Helpers for mapping depot extraction failures to HTTP errors.
pub(crate) trait DepotExt {
    fn obtain_or_500<T: Any + Send + Sync>(&self) -> Result<&T, StatusError>;

    fn insert_principal(&mut self, principal: Principal);

    fn principal_or_401(&self) -> Result<Principal, StatusError>;
}

impl DepotExt for Depot {
    fn obtain_or_500<T: Any + Send + Sync>(&self) -> Result<&T, StatusError> {
        self.obtain::<T>()
            .map_err(|_ignored| StatusError::internal_server_error())
    }

    fn insert_principal(&mut self, principal: Principal) {
        self.inject(principal);
    }

    fn principal_or_401(&self) -> Result<Principal, StatusError> {
        self.obtain::<Principal>()
            .copied()
            .map_err(|_ignored| StatusError::unauthorized().brief("Not authenticated"))
    }
}
