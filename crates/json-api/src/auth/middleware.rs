//! Auth middleware.

use std::sync::Arc;

use bazaar_app::auth::AuthServiceError;
use salvo::{http::header::AUTHORIZATION, prelude::*};
use tracing::error;

use crate::{extensions::*, state::State};

/// Resolve the bearer token into a [`Principal`](bazaar_app::auth::Principal) for the rest of
/// the chain.
#[salvo::handler]
pub(crate) async fn handler(
    req: &mut Request,
    depot: &mut Depot,
    res: &mut Response,
    ctrl: &mut FlowCtrl,
) {
    let Some(token) = extract_bearer_token(req) else {
        res.render(StatusError::unauthorized().brief("Missing or invalid Authorization header"));
        ctrl.skip_rest();

        return;
    };

    let state = match depot.obtain::<Arc<State>>() {
        Ok(state) => state,
        Err(_error) => {
            res.render(StatusError::internal_server_error());
            ctrl.skip_rest();

            return;
        }
    };

    let principal = match state.app.auth.authenticate_bearer(token).await {
        Ok(principal) => principal,
        Err(AuthServiceError::NotFound) => {
            res.render(StatusError::unauthorized().brief("Invalid or expired token"));
            ctrl.skip_rest();

            return;
        }
        Err(source) => {
            error!("failed to authenticate bearer token: {source}");

            res.render(StatusError::internal_server_error());
            ctrl.skip_rest();

            return;
        }
    };

    depot.insert_principal(principal);

    ctrl.call_next(req, depot, res).await;
}

/// Reject callers that are not admins. Must run after [`handler`].
#[salvo::handler]
pub(crate) async fn require_admin(
    req: &mut Request,
    depot: &mut Depot,
    res: &mut Response,
    ctrl: &mut FlowCtrl,
) {
    match depot.principal_or_401() {
        Ok(principal) if principal.is_admin() => {
            ctrl.call_next(req, depot, res).await;
        }
        Ok(_) => {
            res.render(StatusError::forbidden().brief("Admin role required"));
            ctrl.skip_rest();
        }
        Err(status) => {
            res.render(status);
            ctrl.skip_rest();
        }
    }
}

pub(crate) fn extract_bearer_token(req: &Request) -> Option<&str> {
    let value = req.headers().get(AUTHORIZATION)?.to_str().ok()?;
    let mut parts = value.splitn(2, ' ');

    let scheme = parts.next()?;
    let token = parts.next()?.trim();

    if !scheme.eq_ignore_ascii_case("bearer") || token.is_empty() {
        return None;
    }

    Some(token)
}

#[cfg(test)]
mod tests {
    use bazaar_app::auth::{MockAuthService, Principal, Role, UserUuid};
    use salvo::test::{ResponseExt, TestClient};
    use testresult::TestResult;
    use uuid::Uuid;

    use crate::test_helpers::{Caller, TestServices, make_service};

    use super::*;

    #[salvo::handler]
    async fn echo_principal(depot: &mut Depot, res: &mut Response) {
        let principal = depot.principal_or_401().ok().map_or_else(
            || "missing".to_string(),
            |principal: Principal| format!("{}:{}", principal.user, principal.role),
        );

        res.render(principal);
    }

    fn authenticated(auth: MockAuthService) -> Service {
        make_service(
            TestServices::strict().with_auth(auth),
            Caller::Anonymous,
            Router::new().hoop(handler).get(echo_principal),
        )
    }

    fn admin_only(auth: MockAuthService) -> Service {
        make_service(
            TestServices::strict().with_auth(auth),
            Caller::Anonymous,
            Router::new()
                .hoop(handler)
                .hoop(require_admin)
                .get(echo_principal),
        )
    }

    fn resolves_to(role: Role) -> MockAuthService {
        let user = UserUuid::from_uuid(Uuid::nil());

        let mut auth = MockAuthService::new();

        auth.expect_authenticate_bearer()
            .once()
            .withf(|token| token == "abc123")
            .return_once(move |_| Ok(Principal { user, role }));

        auth
    }

    #[tokio::test]
    async fn test_missing_authorization_header_returns_401() -> TestResult {
        let mut auth = MockAuthService::new();

        auth.expect_authenticate_bearer().never();

        let res = TestClient::get("http://example.com")
            .send(&authenticated(auth))
            .await;

        assert_eq!(res.status_code, Some(StatusCode::UNAUTHORIZED));

        Ok(())
    }

    #[tokio::test]
    async fn test_non_bearer_authorization_header_returns_401() -> TestResult {
        let mut auth = MockAuthService::new();

        auth.expect_authenticate_bearer().never();

        let res = TestClient::get("http://example.com")
            .add_header(AUTHORIZATION, "Basic abc123", true)
            .send(&authenticated(auth))
            .await;

        assert_eq!(res.status_code, Some(StatusCode::UNAUTHORIZED));

        Ok(())
    }

    #[tokio::test]
    async fn test_invalid_token_returns_401() -> TestResult {
        let mut auth = MockAuthService::new();

        auth.expect_authenticate_bearer()
            .once()
            .withf(|token| token == "abc123")
            .return_once(|_| Err(AuthServiceError::NotFound));

        let res = TestClient::get("http://example.com")
            .add_header(AUTHORIZATION, "Bearer abc123", true)
            .send(&authenticated(auth))
            .await;

        assert_eq!(res.status_code, Some(StatusCode::UNAUTHORIZED));

        Ok(())
    }

    #[tokio::test]
    async fn test_storage_failure_returns_500() -> TestResult {
        let mut auth = MockAuthService::new();

        auth.expect_authenticate_bearer()
            .once()
            .return_once(|_| Err(AuthServiceError::Sql(sqlx::Error::PoolTimedOut)));

        let res = TestClient::get("http://example.com")
            .add_header(AUTHORIZATION, "Bearer abc123", true)
            .send(&authenticated(auth))
            .await;

        assert_eq!(res.status_code, Some(StatusCode::INTERNAL_SERVER_ERROR));

        Ok(())
    }

    #[tokio::test]
    async fn test_valid_token_injects_principal() -> TestResult {
        let mut res = TestClient::get("http://example.com")
            .add_header(AUTHORIZATION, "bearer abc123", true)
            .send(&authenticated(resolves_to(Role::User)))
            .await;

        assert_eq!(res.status_code, Some(StatusCode::OK));
        assert_eq!(
            res.take_string().await?,
            format!("{}:user", Uuid::nil())
        );

        Ok(())
    }

    #[tokio::test]
    async fn test_require_admin_rejects_users_with_403() -> TestResult {
        let res = TestClient::get("http://example.com")
            .add_header(AUTHORIZATION, "Bearer abc123", true)
            .send(&admin_only(resolves_to(Role::User)))
            .await;

        assert_eq!(res.status_code, Some(StatusCode::FORBIDDEN));

        Ok(())
    }

    #[tokio::test]
    async fn test_require_admin_allows_admins() -> TestResult {
        let mut res = TestClient::get("http://example.com")
            .add_header(AUTHORIZATION, "Bearer abc123", true)
            .send(&admin_only(resolves_to(Role::Admin)))
            .await;

        assert_eq!(res.status_code, Some(StatusCode::OK));
        assert_eq!(
            res.take_string().await?,
            format!("{}:admin", Uuid::nil())
        );

        Ok(())
    }
}
