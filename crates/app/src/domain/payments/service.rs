//! Payments service.
//!
//! Confirmation moves a pending order to exactly one terminal status. Confirming a settled
//! order returns it unchanged, so client retries never take stock twice. A successful
//! payment is checked line by line against current stock first, then settled in a single
//! transaction: either every line's stock is taken and the order is paid, or nothing is.
//! A paid settlement drops cached catalog reads, since their inventory is now stale.

use std::{fmt, sync::Arc};

use async_trait::async_trait;
use mockall::automock;
use tracing::{info, warn};

use crate::{
    cache::ReadThroughCache,
    database::Db,
    domain::{
        orders::{
            records::{OrderRecord, OrderStatus, OrderUuid},
            repository::{OrdersRepository, PgOrdersRepository},
        },
        payments::{
            errors::PaymentsServiceError,
            records::PaymentOutcome,
            repository::{PaymentsRepository, PgPaymentsRepository, Settlement},
        },
        products::{
            keys::{LIST_PATTERN, PRODUCTS_NAMESPACE, SLUG_PATTERN},
            records::ProductUuid,
            repository::{PgProductsRepository, ProductsRepository},
        },
    },
};

#[derive(Clone)]
pub struct PgPaymentsService {
    orders: Arc<dyn OrdersRepository>,
    products: Arc<dyn ProductsRepository>,
    payments: Arc<dyn PaymentsRepository>,
    cache: ReadThroughCache,
}

impl fmt::Debug for PgPaymentsService {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("PgPaymentsService").finish_non_exhaustive()
    }
}

impl PgPaymentsService {
    #[must_use]
    pub fn new(db: Db, cache: ReadThroughCache) -> Self {
        Self::with_repositories(
            Arc::new(PgOrdersRepository::new(db.clone())),
            Arc::new(PgProductsRepository::new(db.clone())),
            Arc::new(PgPaymentsRepository::new(db)),
            cache,
        )
    }

    #[must_use]
    pub fn with_repositories(
        orders: Arc<dyn OrdersRepository>,
        products: Arc<dyn ProductsRepository>,
        payments: Arc<dyn PaymentsRepository>,
        cache: ReadThroughCache,
    ) -> Self {
        Self {
            orders,
            products,
            payments,
            cache,
        }
    }

    async fn current(&self, order: OrderUuid) -> Result<OrderRecord, PaymentsServiceError> {
        self.orders
            .find_order(order)
            .await?
            .ok_or(PaymentsServiceError::OrderNotFound)
    }

    /// Compare-and-set out of `pending`. Losing the race returns the winner's result.
    async fn transition(
        &self,
        order: OrderUuid,
        status: OrderStatus,
    ) -> Result<OrderRecord, PaymentsServiceError> {
        match self.orders.transition_order(order, status).await? {
            Some(updated) => Ok(updated),
            None => self.current(order).await,
        }
    }

    async fn available(&self, product: ProductUuid) -> Result<u32, PaymentsServiceError> {
        Ok(self
            .products
            .find_product(product)
            .await?
            .map_or(0, |product| product.inventory))
    }

    /// Fail the order on short stock. Losing the compare-and-set returns the winner's order.
    async fn reject(
        &self,
        order: &OrderRecord,
        product: ProductUuid,
        requested: u32,
        available: u32,
    ) -> Result<OrderRecord, PaymentsServiceError> {
        if self
            .orders
            .transition_order(order.uuid, OrderStatus::Failed)
            .await?
            .is_none()
        {
            return self.current(order.uuid).await;
        }

        let name = order
            .lines
            .iter()
            .find(|line| line.product_ref == product)
            .map(|line| line.name.clone())
            .unwrap_or_default();

        warn!(
            order = %order.uuid,
            product = %product,
            requested,
            available,
            "payment failed on insufficient inventory"
        );

        Err(PaymentsServiceError::InsufficientInventory {
            product,
            name,
            requested,
            available,
        })
    }

    async fn invalidate_catalog(&self) {
        for pattern in [SLUG_PATTERN, LIST_PATTERN] {
            self.cache
                .invalidate_matching(PRODUCTS_NAMESPACE, pattern)
                .await;
        }
    }

    async fn pay(&self, order: OrderRecord) -> Result<OrderRecord, PaymentsServiceError> {
        for line in &order.lines {
            let available = self.available(line.product_ref).await?;

            if available < line.quantity {
                return self
                    .reject(&order, line.product_ref, line.quantity, available)
                    .await;
            }
        }

        match self.payments.settle(&order).await? {
            Settlement::Paid(paid) => {
                self.invalidate_catalog().await;

                info!(order = %paid.uuid, total = %paid.total, "order paid");

                Ok(paid)
            }
            Settlement::AlreadySettled => self.current(order.uuid).await,
            Settlement::OutOfStock { product, requested } => {
                let available = self.available(product).await?;

                self.reject(&order, product, requested, available).await
            }
        }
    }
}

#[async_trait]
impl PaymentsService for PgPaymentsService {
    async fn confirm(
        &self,
        order: OrderUuid,
        outcome: PaymentOutcome,
    ) -> Result<OrderRecord, PaymentsServiceError> {
        let pending = self.current(order).await?;

        if pending.status.is_terminal() {
            return Ok(pending);
        }

        match outcome {
            PaymentOutcome::Success => self.pay(pending).await,
            PaymentOutcome::Failure => self.transition(order, OrderStatus::Failed).await,
            PaymentOutcome::Canceled => self.transition(order, OrderStatus::Canceled).await,
        }
    }
}

#[automock]
#[async_trait]
pub trait PaymentsService: Send + Sync {
    /// Apply a payment outcome to a pending order.
    async fn confirm(
        &self,
        order: OrderUuid,
        outcome: PaymentOutcome,
    ) -> Result<OrderRecord, PaymentsServiceError>;
}

#[cfg(test)]
mod tests {
    use std::time::Duration;

    use jiff::Timestamp;
    use mockall::predicate::eq;
    use rust_decimal::Decimal;
    use testresult::TestResult;

    use crate::{
        auth::UserUuid,
        cache::MockCacheBackend,
        domain::{
            orders::{records::OrderLineRecord, repository::MockOrdersRepository},
            payments::repository::MockPaymentsRepository,
            products::{records::ProductRecord, repository::MockProductsRepository},
        },
    };

    use super::*;

    fn line(product: ProductUuid, name: &str, quantity: u32) -> OrderLineRecord {
        OrderLineRecord {
            product_ref: product,
            catalog_id: 1,
            name: name.to_string(),
            unit_price: Decimal::new(1000, 2),
            quantity,
            line_total: Decimal::new(1000, 2) * Decimal::from(quantity),
        }
    }

    fn order(status: OrderStatus, lines: Vec<OrderLineRecord>) -> OrderRecord {
        OrderRecord {
            uuid: OrderUuid::new(),
            owner: UserUuid::new(),
            total: lines.iter().map(|line| line.line_total).sum(),
            lines,
            currency: "usd".to_string(),
            status,
            created_at: Timestamp::UNIX_EPOCH,
            updated_at: Timestamp::UNIX_EPOCH,
        }
    }

    fn with_status(order: &OrderRecord, status: OrderStatus) -> OrderRecord {
        OrderRecord {
            status,
            ..order.clone()
        }
    }

    fn product(uuid: ProductUuid, inventory: u32) -> ProductRecord {
        ProductRecord {
            uuid,
            catalog_id: 1,
            name: "Mug".to_string(),
            slug: "mug".to_string(),
            description: None,
            price: Decimal::new(1000, 2),
            image_url: None,
            inventory,
            category: None,
            is_active: true,
            created_at: Timestamp::UNIX_EPOCH,
            updated_at: Timestamp::UNIX_EPOCH,
        }
    }

    fn service(
        orders: MockOrdersRepository,
        products: MockProductsRepository,
        payments: MockPaymentsRepository,
    ) -> PgPaymentsService {
        PgPaymentsService::with_repositories(
            Arc::new(orders),
            Arc::new(products),
            Arc::new(payments),
            ReadThroughCache::disabled(),
        )
    }

    #[tokio::test]
    async fn unknown_order_is_not_found() {
        let mut orders = MockOrdersRepository::new();

        orders.expect_find_order().return_once(|_| Ok(None));
        orders.expect_transition_order().never();

        let result = service(
            orders,
            MockProductsRepository::new(),
            MockPaymentsRepository::new(),
        )
        .confirm(OrderUuid::new(), PaymentOutcome::Success)
        .await;

        assert!(
            matches!(result, Err(PaymentsServiceError::OrderNotFound)),
            "expected OrderNotFound, got {result:?}"
        );
    }

    #[tokio::test]
    async fn settled_orders_are_returned_unchanged() -> TestResult {
        for status in [OrderStatus::Paid, OrderStatus::Canceled, OrderStatus::Failed] {
            let settled = order(status, vec![line(ProductUuid::new(), "Mug", 1)]);
            let returned = settled.clone();

            let mut orders = MockOrdersRepository::new();
            let mut products = MockProductsRepository::new();
            let mut payments = MockPaymentsRepository::new();

            orders
                .expect_find_order()
                .once()
                .return_once(move |_| Ok(Some(returned)));
            orders.expect_transition_order().never();
            products.expect_find_product().never();
            payments.expect_settle().never();

            let confirmed = service(orders, products, payments)
                .confirm(settled.uuid, PaymentOutcome::Success)
                .await?;

            assert_eq!(confirmed, settled);
        }

        Ok(())
    }

    #[tokio::test]
    async fn canceled_outcome_touches_no_inventory() -> TestResult {
        let pending = order(OrderStatus::Pending, vec![line(ProductUuid::new(), "Mug", 1)]);
        let canceled = with_status(&pending, OrderStatus::Canceled);
        let found = pending.clone();

        let mut orders = MockOrdersRepository::new();
        let mut products = MockProductsRepository::new();
        let mut payments = MockPaymentsRepository::new();

        orders
            .expect_find_order()
            .return_once(move |_| Ok(Some(found)));
        orders
            .expect_transition_order()
            .once()
            .with(eq(pending.uuid), eq(OrderStatus::Canceled))
            .return_once(move |_, _| Ok(Some(canceled)));
        products.expect_find_product().never();
        payments.expect_settle().never();

        let confirmed = service(orders, products, payments)
            .confirm(pending.uuid, PaymentOutcome::Canceled)
            .await?;

        assert_eq!(confirmed.status, OrderStatus::Canceled);

        Ok(())
    }

    #[tokio::test]
    async fn failure_outcome_marks_failed() -> TestResult {
        let pending = order(OrderStatus::Pending, vec![line(ProductUuid::new(), "Mug", 1)]);
        let failed = with_status(&pending, OrderStatus::Failed);
        let found = pending.clone();

        let mut orders = MockOrdersRepository::new();
        let mut payments = MockPaymentsRepository::new();

        orders
            .expect_find_order()
            .return_once(move |_| Ok(Some(found)));
        orders
            .expect_transition_order()
            .once()
            .with(eq(pending.uuid), eq(OrderStatus::Failed))
            .return_once(move |_, _| Ok(Some(failed)));
        payments.expect_settle().never();

        let confirmed = service(orders, MockProductsRepository::new(), payments)
            .confirm(pending.uuid, PaymentOutcome::Failure)
            .await?;

        assert_eq!(confirmed.status, OrderStatus::Failed);

        Ok(())
    }

    #[tokio::test]
    async fn success_settles_when_every_line_is_in_stock() -> TestResult {
        let cup = ProductUuid::new();
        let pot = ProductUuid::new();
        let pending = order(
            OrderStatus::Pending,
            vec![line(cup, "Cup", 2), line(pot, "Pot", 1)],
        );
        let paid = with_status(&pending, OrderStatus::Paid);
        let found = pending.clone();
        let uuid = pending.uuid;

        let mut orders = MockOrdersRepository::new();
        let mut products = MockProductsRepository::new();
        let mut payments = MockPaymentsRepository::new();

        orders
            .expect_find_order()
            .return_once(move |_| Ok(Some(found)));
        orders.expect_transition_order().never();
        products
            .expect_find_product()
            .times(2)
            .returning(|uuid| Ok(Some(product(uuid, 2))));
        payments
            .expect_settle()
            .once()
            .withf(move |order| order.uuid == uuid)
            .return_once(move |_| Ok(Settlement::Paid(paid)));

        let confirmed = service(orders, products, payments)
            .confirm(pending.uuid, PaymentOutcome::Success)
            .await?;

        assert_eq!(confirmed.status, OrderStatus::Paid);

        Ok(())
    }

    #[tokio::test]
    async fn paid_settlement_drops_cached_catalog_reads() -> TestResult {
        let cup = ProductUuid::new();
        let pending = order(OrderStatus::Pending, vec![line(cup, "Cup", 1)]);
        let paid = with_status(&pending, OrderStatus::Paid);
        let found = pending.clone();

        let mut orders = MockOrdersRepository::new();
        let mut products = MockProductsRepository::new();
        let mut payments = MockPaymentsRepository::new();
        let mut backend = MockCacheBackend::new();

        orders
            .expect_find_order()
            .return_once(move |_| Ok(Some(found)));
        products
            .expect_find_product()
            .returning(|uuid| Ok(Some(product(uuid, 3))));
        payments
            .expect_settle()
            .once()
            .return_once(move |_| Ok(Settlement::Paid(paid)));
        backend
            .expect_delete_matching()
            .once()
            .withf(|namespace, pattern| namespace == "products" && pattern == "slug:*")
            .return_once(|_, _| Ok(1));
        backend
            .expect_delete_matching()
            .once()
            .withf(|namespace, pattern| namespace == "products" && pattern == "list:*")
            .return_once(|_, _| Ok(2));

        let confirmed = PgPaymentsService::with_repositories(
            Arc::new(orders),
            Arc::new(products),
            Arc::new(payments),
            ReadThroughCache::new(Arc::new(backend), Duration::from_secs(60)),
        )
        .confirm(pending.uuid, PaymentOutcome::Success)
        .await?;

        assert_eq!(confirmed.status, OrderStatus::Paid);

        Ok(())
    }

    #[tokio::test]
    async fn failed_payment_leaves_the_catalog_cache_alone() {
        let pending = order(OrderStatus::Pending, vec![line(ProductUuid::new(), "Mug", 4)]);
        let failed = with_status(&pending, OrderStatus::Failed);
        let found = pending.clone();

        let mut orders = MockOrdersRepository::new();
        let mut products = MockProductsRepository::new();
        let mut backend = MockCacheBackend::new();

        orders
            .expect_find_order()
            .return_once(move |_| Ok(Some(found)));
        orders
            .expect_transition_order()
            .once()
            .return_once(move |_, _| Ok(Some(failed)));
        products
            .expect_find_product()
            .returning(|uuid| Ok(Some(product(uuid, 1))));
        backend.expect_delete_matching().never();

        let result = PgPaymentsService::with_repositories(
            Arc::new(orders),
            Arc::new(products),
            Arc::new(MockPaymentsRepository::new()),
            ReadThroughCache::new(Arc::new(backend), Duration::from_secs(60)),
        )
        .confirm(pending.uuid, PaymentOutcome::Success)
        .await;

        assert!(
            matches!(result, Err(PaymentsServiceError::InsufficientInventory { .. })),
            "expected InsufficientInventory, got {result:?}"
        );
    }

    /// A short line anywhere in the order fails the payment before any stock is taken.
    #[tokio::test]
    async fn short_stock_on_any_line_fails_without_settling() {
        let cup = ProductUuid::new();
        let pot = ProductUuid::new();
        let pending = order(
            OrderStatus::Pending,
            vec![line(cup, "Cup", 2), line(pot, "Pot", 3)],
        );
        let failed = with_status(&pending, OrderStatus::Failed);
        let found = pending.clone();

        let mut orders = MockOrdersRepository::new();
        let mut products = MockProductsRepository::new();
        let mut payments = MockPaymentsRepository::new();

        orders
            .expect_find_order()
            .return_once(move |_| Ok(Some(found)));
        orders
            .expect_transition_order()
            .once()
            .with(eq(pending.uuid), eq(OrderStatus::Failed))
            .return_once(move |_, _| Ok(Some(failed)));
        products
            .expect_find_product()
            .returning(move |uuid| Ok(Some(product(uuid, if uuid == pot { 1 } else { 10 }))));
        payments.expect_settle().never();

        let result = service(orders, products, payments)
            .confirm(pending.uuid, PaymentOutcome::Success)
            .await;

        match result {
            Err(PaymentsServiceError::InsufficientInventory {
                product,
                name,
                requested,
                available,
            }) => {
                assert_eq!(product, pot);
                assert_eq!(name, "Pot");
                assert_eq!(requested, 3);
                assert_eq!(available, 1);
            }
            other => panic!("expected InsufficientInventory, got {other:?}"),
        }
    }

    #[tokio::test]
    async fn missing_product_counts_as_no_stock() {
        let gone = ProductUuid::new();
        let pending = order(OrderStatus::Pending, vec![line(gone, "Gone", 1)]);
        let failed = with_status(&pending, OrderStatus::Failed);
        let found = pending.clone();

        let mut orders = MockOrdersRepository::new();
        let mut products = MockProductsRepository::new();
        let mut payments = MockPaymentsRepository::new();

        orders
            .expect_find_order()
            .return_once(move |_| Ok(Some(found)));
        orders
            .expect_transition_order()
            .once()
            .return_once(move |_, _| Ok(Some(failed)));
        products.expect_find_product().return_once(|_| Ok(None));
        payments.expect_settle().never();

        let result = service(orders, products, payments)
            .confirm(pending.uuid, PaymentOutcome::Success)
            .await;

        assert!(
            matches!(
                result,
                Err(PaymentsServiceError::InsufficientInventory { available: 0, .. })
            ),
            "expected InsufficientInventory, got {result:?}"
        );
    }

    /// Stock sold between the check and the settlement transaction fails the order.
    #[tokio::test]
    async fn concurrent_sale_during_settlement_fails_the_order() {
        let cup = ProductUuid::new();
        let pending = order(OrderStatus::Pending, vec![line(cup, "Cup", 2)]);
        let failed = with_status(&pending, OrderStatus::Failed);
        let found = pending.clone();

        let mut orders = MockOrdersRepository::new();
        let mut products = MockProductsRepository::new();
        let mut payments = MockPaymentsRepository::new();

        orders
            .expect_find_order()
            .return_once(move |_| Ok(Some(found)));
        orders
            .expect_transition_order()
            .once()
            .with(eq(pending.uuid), eq(OrderStatus::Failed))
            .return_once(move |_, _| Ok(Some(failed)));

        let mut checks = 0;

        products.expect_find_product().times(2).returning(move |uuid| {
            checks += 1;

            Ok(Some(product(uuid, if checks == 1 { 2 } else { 1 })))
        });

        payments.expect_settle().once().return_once(move |_| {
            Ok(Settlement::OutOfStock {
                product: cup,
                requested: 2,
            })
        });

        let result = service(orders, products, payments)
            .confirm(pending.uuid, PaymentOutcome::Success)
            .await;

        assert!(
            matches!(
                result,
                Err(PaymentsServiceError::InsufficientInventory {
                    requested: 2,
                    available: 1,
                    ..
                })
            ),
            "expected InsufficientInventory, got {result:?}"
        );
    }

    /// Losing the `pending` compare-and-set to another confirmation returns the winner's order.
    #[tokio::test]
    async fn concurrent_confirmation_returns_settled_order() -> TestResult {
        let cup = ProductUuid::new();
        let pending = order(OrderStatus::Pending, vec![line(cup, "Cup", 1)]);
        let paid = with_status(&pending, OrderStatus::Paid);
        let first = pending.clone();
        let reloaded = paid.clone();

        let mut orders = MockOrdersRepository::new();
        let mut products = MockProductsRepository::new();
        let mut payments = MockPaymentsRepository::new();

        let mut lookups = 0;

        orders.expect_find_order().times(2).returning(move |_| {
            lookups += 1;

            Ok(Some(if lookups == 1 {
                first.clone()
            } else {
                reloaded.clone()
            }))
        });
        orders.expect_transition_order().never();
        products
            .expect_find_product()
            .returning(|uuid| Ok(Some(product(uuid, 5))));
        payments
            .expect_settle()
            .once()
            .return_once(|_| Ok(Settlement::AlreadySettled));

        let confirmed = service(orders, products, payments)
            .confirm(pending.uuid, PaymentOutcome::Success)
            .await?;

        assert_eq!(confirmed, paid);

        Ok(())
    }

    /// A confirmation that wins the race while stock is being checked keeps its result.
    #[tokio::test]
    async fn short_stock_after_a_concurrent_payment_returns_the_paid_order() -> TestResult {
        let cup = ProductUuid::new();
        let pending = order(OrderStatus::Pending, vec![line(cup, "Cup", 2)]);
        let paid = with_status(&pending, OrderStatus::Paid);
        let first = pending.clone();
        let reloaded = paid.clone();

        let mut orders = MockOrdersRepository::new();
        let mut products = MockProductsRepository::new();
        let mut payments = MockPaymentsRepository::new();

        let mut lookups = 0;

        orders.expect_find_order().times(2).returning(move |_| {
            lookups += 1;

            Ok(Some(if lookups == 1 {
                first.clone()
            } else {
                reloaded.clone()
            }))
        });
        orders
            .expect_transition_order()
            .once()
            .with(eq(pending.uuid), eq(OrderStatus::Failed))
            .return_once(|_, _| Ok(None));
        products
            .expect_find_product()
            .returning(|uuid| Ok(Some(product(uuid, 0))));
        payments.expect_settle().never();

        let confirmed = service(orders, products, payments)
            .confirm(pending.uuid, PaymentOutcome::Success)
            .await?;

        assert_eq!(confirmed, paid);

        Ok(())
    }
}
