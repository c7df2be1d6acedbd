//! Signup Handler

use std::sync::Arc;

use salvo::{oapi::extract::JsonBody, prelude::*};

use crate::{
    auth::{CredentialsRequest, TokenResponse, into_status_error},
    extensions::*,
    observability::{self, AuthEvent},
    state::State,
};

/// Signup Handler
///
/// Registers a user account and returns a bearer token for it.
#[endpoint(
    tags("auth"),
    summary = "Sign Up",
    responses(
        (status_code = StatusCode::CREATED, description = "Account created"),
        (status_code = StatusCode::BAD_REQUEST, description = "Email taken or invalid credentials"),
        (status_code = StatusCode::INTERNAL_SERVER_ERROR, description = "Internal Server Error"),
    ),
)]
#[tracing::instrument(name = "auth.signup", skip(json, depot, res), err)]
pub(crate) async fn handler(
    json: JsonBody<CredentialsRequest>,
    depot: &mut Depot,
    res: &mut Response,
) -> Result<Json<TokenResponse>, StatusError> {
    let state = depot.obtain_or_500::<Arc<State>>()?;
    let request = json.into_inner();

    let session = state
        .app
        .auth
        .signup(&request.email, &request.password)
        .await
        .map_err(into_status_error)?;

    observability::record_auth_event(AuthEvent::Signup);

    res.status_code(StatusCode::CREATED);

    Ok(Json(session.into()))
}
