//! Get Cart Handler

use std::sync::Arc;

use salvo::prelude::*;

use crate::{
    carts::{CartResponse, errors::into_status_error},
    extensions::*,
    state::State,
};

/// Get Cart Handler
///
/// Returns the caller's cart, creating an empty one on first access.
#[endpoint(
    tags("cart"),
    summary = "Get Cart",
    security(("bearer_auth" = []))
)]
pub(crate) async fn handler(depot: &mut Depot) -> Result<Json<CartResponse>, StatusError> {
    let state = depot.obtain_or_500::<Arc<State>>()?;
    let principal = depot.principal_or_401()?;

    let cart = state
        .app
        .carts
        .get_cart(principal.user)
        .await
        .map_err(into_status_error)?;

    Ok(Json(cart.into()))
}

#[cfg(test)]
mod tests {
    use bazaar_app::domain::carts::{CartsServiceError, MockCartsService};
    use salvo::test::{ResponseExt, TestClient};
    use testresult::TestResult;

    use crate::{
        carts::CartItemResponse,
        test_helpers::{Caller, TEST_USER_UUID, TestServices, make_cart, make_service},
    };

    use super::*;

    fn service(carts: MockCartsService) -> Service {
        make_service(
            TestServices::strict().with_carts(carts),
            Caller::User,
            Router::with_path("cart").get(handler),
        )
    }

    #[tokio::test]
    async fn test_get_returns_callers_cart() -> TestResult {
        let mut carts = MockCartsService::new();

        carts
            .expect_get_cart()
            .once()
            .withf(|owner| *owner == TEST_USER_UUID)
            .return_once(|owner| Ok(make_cart(owner, &[(7, 2)])));

        let mut res = TestClient::get("http://example.com/cart")
            .send(&service(carts))
            .await;

        let body: CartResponse = res.take_json().await?;

        assert_eq!(res.status_code, Some(StatusCode::OK));
        assert_eq!(
            body.items,
            vec![CartItemResponse {
                catalog_id: 7,
                quantity: 2
            }]
        );

        Ok(())
    }

    #[tokio::test]
    async fn test_get_storage_failure_returns_500() -> TestResult {
        let mut carts = MockCartsService::new();

        carts
            .expect_get_cart()
            .once()
            .return_once(|_| Err(CartsServiceError::Sql(sqlx::Error::PoolTimedOut)));

        let res = TestClient::get("http://example.com/cart")
            .send(&service(carts))
            .await;

        assert_eq!(res.status_code, Some(StatusCode::INTERNAL_SERVER_ERROR));

        Ok(())
    }
}
