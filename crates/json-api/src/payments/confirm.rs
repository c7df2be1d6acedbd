//! Confirm Payment Handler

use std::sync::Arc;

use salvo::{
    oapi::{ToSchema, extract::QueryParam},
    prelude::*,
};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use bazaar_app::domain::{orders::records::OrderUuid, payments::records::PaymentOutcome};

use crate::{extensions::*, observability, orders, payments::errors::into_status_error, state::State};

/// Payment Confirmation Response
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub(crate) struct PaymentConfirmedResponse {
    pub order_id: Uuid,
    /// Status after the outcome was applied
    pub status: String,
}

/// Confirm Payment Handler
///
/// Applies a mock payment outcome (`success`, `failure` or `canceled`; default `success`) to
/// one of the caller's pending orders. Settled orders are returned unchanged.
#[endpoint(
    tags("payments"),
    summary = "Confirm Payment",
    security(("bearer_auth" = [])),
    responses(
        (status_code = StatusCode::OK, description = "Outcome applied"),
        (status_code = StatusCode::BAD_REQUEST, description = "Unknown outcome or insufficient inventory"),
        (status_code = StatusCode::FORBIDDEN, description = "Order belongs to another user"),
        (status_code = StatusCode::NOT_FOUND, description = "Order not found"),
    ),
)]
#[tracing::instrument(
    name = "payments.confirm",
    skip(order_id, outcome, depot),
    fields(order_uuid = tracing::field::Empty, outcome = tracing::field::Empty),
    err
)]
pub(crate) async fn handler(
    order_id: QueryParam<Uuid, true>,
    outcome: QueryParam<String, false>,
    depot: &mut Depot,
) -> Result<Json<PaymentConfirmedResponse>, StatusError> {
    let state = depot.obtain_or_500::<Arc<State>>()?;
    let principal = depot.principal_or_401()?;
    let order = OrderUuid::from_uuid(order_id.into_inner());

    let outcome = match outcome.into_inner() {
        Some(outcome) => outcome
            .parse::<PaymentOutcome>()
            .or_400("Unknown payment outcome")?,
        None => PaymentOutcome::default(),
    };

    let span = tracing::Span::current();

    span.record("order_uuid", tracing::field::display(order));
    span.record("outcome", tracing::field::debug(outcome));

    state
        .app
        .orders
        .get_order(principal.user, order)
        .await
        .map_err(orders::into_status_error)?;

    let confirmed = state
        .app
        .payments
        .confirm(order, outcome)
        .await
        .map_err(into_status_error)?;

    observability::record_payment(outcome.as_str(), confirmed.status.as_str());

    Ok(Json(PaymentConfirmedResponse {
        order_id: confirmed.uuid.into_uuid(),
        status: confirmed.status.to_string(),
    }))
}

#[cfg(test)]
mod tests {
    use bazaar_app::domain::{
        orders::{MockOrdersService, OrdersServiceError, records::OrderStatus},
        payments::{MockPaymentsService, PaymentsServiceError},
        products::records::ProductUuid,
    };
    use mockall::predicate::eq;
    use salvo::test::{ResponseExt, TestClient};
    use testresult::TestResult;

    use crate::test_helpers::{Caller, TEST_USER_UUID, TestServices, make_order, make_service};

    use super::*;

    fn service(orders: MockOrdersService, payments: MockPaymentsService) -> Service {
        make_service(
            TestServices::strict()
                .with_orders(orders)
                .with_payments(payments),
            Caller::User,
            Router::with_path("payments/confirm").post(handler),
        )
    }

    fn owned_order(order: OrderUuid) -> MockOrdersService {
        let mut pending = make_order(TEST_USER_UUID, OrderStatus::Pending);

        pending.uuid = order;

        let mut orders = MockOrdersService::new();

        orders
            .expect_get_order()
            .once()
            .with(eq(TEST_USER_UUID), eq(order))
            .return_once(move |_, _| Ok(pending));

        orders
    }

    #[tokio::test]
    async fn test_confirm_defaults_to_success() -> TestResult {
        let order = OrderUuid::new();

        let mut payments = MockPaymentsService::new();

        payments
            .expect_confirm()
            .once()
            .with(eq(order), eq(PaymentOutcome::Success))
            .return_once(move |_, _| {
                let mut paid = make_order(TEST_USER_UUID, OrderStatus::Paid);

                paid.uuid = order;

                Ok(paid)
            });

        let mut res = TestClient::post(format!(
            "http://example.com/payments/confirm?order_id={order}"
        ))
        .send(&service(owned_order(order), payments))
        .await;

        let body: PaymentConfirmedResponse = res.take_json().await?;

        assert_eq!(res.status_code, Some(StatusCode::OK));
        assert_eq!(body.order_id, order.into_uuid());
        assert_eq!(body.status, "paid");

        Ok(())
    }

    #[tokio::test]
    async fn test_confirm_forwards_canceled_outcome() -> TestResult {
        let order = OrderUuid::new();

        let mut payments = MockPaymentsService::new();

        payments
            .expect_confirm()
            .once()
            .with(eq(order), eq(PaymentOutcome::Canceled))
            .return_once(|_, _| Ok(make_order(TEST_USER_UUID, OrderStatus::Canceled)));

        let mut res = TestClient::post(format!(
            "http://example.com/payments/confirm?order_id={order}&outcome=canceled"
        ))
        .send(&service(owned_order(order), payments))
        .await;

        let body: PaymentConfirmedResponse = res.take_json().await?;

        assert_eq!(body.status, "canceled");

        Ok(())
    }

    #[tokio::test]
    async fn test_confirm_unknown_outcome_returns_400() -> TestResult {
        let mut orders = MockOrdersService::new();
        let mut payments = MockPaymentsService::new();

        orders.expect_get_order().never();
        payments.expect_confirm().never();

        let res = TestClient::post(format!(
            "http://example.com/payments/confirm?order_id={}&outcome=refunded",
            Uuid::now_v7()
        ))
        .send(&service(orders, payments))
        .await;

        assert_eq!(res.status_code, Some(StatusCode::BAD_REQUEST));

        Ok(())
    }

    #[tokio::test]
    async fn test_confirm_other_users_order_returns_403() -> TestResult {
        let mut orders = MockOrdersService::new();
        let mut payments = MockPaymentsService::new();

        orders
            .expect_get_order()
            .once()
            .return_once(|_, _| Err(OrdersServiceError::Forbidden));

        payments.expect_confirm().never();

        let res = TestClient::post(format!(
            "http://example.com/payments/confirm?order_id={}",
            Uuid::now_v7()
        ))
        .send(&service(orders, payments))
        .await;

        assert_eq!(res.status_code, Some(StatusCode::FORBIDDEN));

        Ok(())
    }

    #[tokio::test]
    async fn test_confirm_without_order_id_returns_400() -> TestResult {
        let mut orders = MockOrdersService::new();
        let mut payments = MockPaymentsService::new();

        orders.expect_get_order().never();
        payments.expect_confirm().never();

        let res = TestClient::post("http://example.com/payments/confirm")
            .send(&service(orders, payments))
            .await;

        assert_eq!(res.status_code, Some(StatusCode::BAD_REQUEST));

        Ok(())
    }

    #[tokio::test]
    async fn test_confirm_with_short_stock_returns_400() -> TestResult {
        let order = OrderUuid::new();

        let mut payments = MockPaymentsService::new();

        payments
            .expect_confirm()
            .once()
            .return_once(|_, _| {
                Err(PaymentsServiceError::InsufficientInventory {
                    product: ProductUuid::new(),
                    name: "Blue Mug".to_string(),
                    requested: 3,
                    available: 2,
                })
            });

        let res = TestClient::post(format!(
            "http://example.com/payments/confirm?order_id={order}"
        ))
        .send(&service(owned_order(order), payments))
        .await;

        assert_eq!(res.status_code, Some(StatusCode::BAD_REQUEST));

        Ok(())
    }
}
