//! Login Handler

use std::sync::Arc;

use salvo::{oapi::extract::JsonBody, prelude::*};

use crate::{
    auth::{CredentialsRequest, TokenResponse, into_status_error},
    extensions::*,
    observability::{self, AuthEvent},
    state::State,
};

/// Login Handler
///
/// Exchanges credentials for a fresh bearer token.
#[endpoint(
    tags("auth"),
    summary = "Log In",
    responses(
        (status_code = StatusCode::OK, description = "Token issued"),
        (status_code = StatusCode::UNAUTHORIZED, description = "Incorrect email or password"),
        (status_code = StatusCode::INTERNAL_SERVER_ERROR, description = "Internal Server Error"),
    ),
)]
#[tracing::instrument(name = "auth.login", skip(json, depot), err)]
pub(crate) async fn handler(
    json: JsonBody<CredentialsRequest>,
    depot: &mut Depot,
) -> Result<Json<TokenResponse>, StatusError> {
    let state = depot.obtain_or_500::<Arc<State>>()?;
    let request = json.into_inner();

    let session = state
        .app
        .auth
        .login(&request.email, &request.password)
        .await
        .map_err(into_status_error)?;

    observability::record_auth_event(AuthEvent::Login);

    Ok(Json(session.into()))
}

#[cfg(test)]
mod tests {
    use bazaar_app::auth::{AuthServiceError, IssuedSession, MockAuthService, Role, UserUuid};
    use jiff::Timestamp;
    use salvo::test::{ResponseExt, TestClient};
    use serde_json::json;
    use testresult::TestResult;

    use crate::test_helpers::{Caller, TestServices, make_service, make_user};

    use super::*;

    fn service(auth: MockAuthService) -> Service {
        make_service(
            TestServices::strict().with_auth(auth),
            Caller::Anonymous,
            Router::with_path("auth/login").post(handler),
        )
    }

    #[tokio::test]
    async fn test_login_returns_token() -> TestResult {
        let user = make_user(UserUuid::new(), "boss@example.com", Role::Admin);

        let mut auth = MockAuthService::new();

        auth.expect_login()
            .once()
            .withf(|email, password| email == "boss@example.com" && password == "s3cret!")
            .return_once(move |_, _| {
                Ok(IssuedSession {
                    token: "bz_v1_token".to_string(),
                    user,
                    expires_at: Timestamp::UNIX_EPOCH,
                })
            });

        let mut res = TestClient::post("http://example.com/auth/login")
            .json(&json!({ "email": "boss@example.com", "password": "s3cret!" }))
            .send(&service(auth))
            .await;

        let body: TokenResponse = res.take_json().await?;

        assert_eq!(res.status_code, Some(StatusCode::OK));
        assert_eq!(body.access_token, "bz_v1_token");
        assert_eq!(body.user.role, "admin");

        Ok(())
    }

    #[tokio::test]
    async fn test_login_with_wrong_password_returns_401() -> TestResult {
        let mut auth = MockAuthService::new();

        auth.expect_login()
            .once()
            .return_once(|_, _| Err(AuthServiceError::InvalidCredentials));

        let res = TestClient::post("http://example.com/auth/login")
            .json(&json!({ "email": "boss@example.com", "password": "nope" }))
            .send(&service(auth))
            .await;

        assert_eq!(res.status_code, Some(StatusCode::UNAUTHORIZED));

        Ok(())
    }

    #[tokio::test]
    async fn test_login_without_body_returns_400() -> TestResult {
        let mut auth = MockAuthService::new();

        auth.expect_login().never();

        let res = TestClient::post("http://example.com/auth/login")
            .send(&service(auth))
            .await;

        assert_eq!(res.status_code, Some(StatusCode::BAD_REQUEST));

        Ok(())
    }
}
