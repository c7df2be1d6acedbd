//! Liveness probe

use salvo::{oapi::ToSchema, prelude::*};
use serde::{Deserialize, Serialize};

#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub(crate) struct HealthResponse {
    /// Always `"ok"` while the process is serving
    pub status: String,

    /// Running build of the API
    pub version: String,
}

/// Healthcheck Handler
///
/// Answers without touching the database, so it reports liveness only.
#[endpoint(tags("health"), summary = "Liveness check")]
pub(crate) async fn handler() -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "ok".to_string(),
        version: env!("CARGO_PKG_VERSION").to_string(),
    })
}
