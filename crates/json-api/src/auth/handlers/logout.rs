//! Logout Handler

use std::sync::Arc;

use salvo::prelude::*;

use crate::{
    auth::{into_status_error, middleware::extract_bearer_token},
    extensions::*,
    observability::{self, AuthEvent},
    state::State,
};

/// Logout Handler
///
/// Revokes the bearer token used for this request.
#[endpoint(
    tags("auth"),
    summary = "Log Out",
    security(("bearer_auth" = [])),
    responses(
        (status_code = StatusCode::NO_CONTENT, description = "Token revoked"),
        (status_code = StatusCode::UNAUTHORIZED, description = "Not authenticated"),
    ),
)]
#[tracing::instrument(name = "auth.logout", skip(req, depot), err)]
pub(crate) async fn handler(req: &mut Request, depot: &mut Depot) -> Result<StatusCode, StatusError> {
    let state = depot.obtain_or_500::<Arc<State>>()?;

    let token = extract_bearer_token(req)
        .ok_or_else(|| StatusError::unauthorized().brief("Missing or invalid Authorization header"))?;

    state
        .app
        .auth
        .logout(token)
        .await
        .map_err(into_status_error)?;

    observability::record_auth_event(AuthEvent::Logout);

    Ok(StatusCode::NO_CONTENT)
}
