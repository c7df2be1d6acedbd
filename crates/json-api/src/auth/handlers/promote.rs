//! Promote To Admin Handler

use std::sync::Arc;

use salvo::{
    oapi::{ToSchema, extract::JsonBody},
    prelude::*,
};
use serde::{Deserialize, Serialize};

use crate::{
    auth::{UserResponse, into_status_error},
    extensions::*,
    state::State,
};

/// Promote Request
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub(crate) struct PromoteRequest {
    /// Email of the account to promote
    pub email: String,
}

/// Promote To Admin Handler
#[endpoint(
    tags("auth"),
    summary = "Promote User To Admin",
    security(("bearer_auth" = [])),
    responses(
        (status_code = StatusCode::OK, description = "User promoted"),
        (status_code = StatusCode::BAD_REQUEST, description = "User is already an admin"),
        (status_code = StatusCode::FORBIDDEN, description = "Admin role required"),
        (status_code = StatusCode::NOT_FOUND, description = "User not found"),
    ),
)]
#[tracing::instrument(
    name = "auth.promote",
    skip(json, depot),
    fields(admin_uuid = tracing::field::Empty),
    err
)]
pub(crate) async fn handler(
    json: JsonBody<PromoteRequest>,
    depot: &mut Depot,
) -> Result<Json<UserResponse>, StatusError> {
    let state = depot.obtain_or_500::<Arc<State>>()?;
    let principal = depot.principal_or_401()?;

    tracing::Span::current().record("admin_uuid", tracing::field::display(principal.user));

    let promoted = state
        .app
        .auth
        .promote_to_admin(&json.into_inner().email)
        .await
        .map_err(into_status_error)?;

    Ok(Json(promoted.into()))
}
