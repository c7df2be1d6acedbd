//! Orders service.

use std::{fmt, sync::Arc};

use async_trait::async_trait;
use mockall::automock;

use crate::{
    auth::UserUuid,
    database::Db,
    domain::{
        orders::{
            errors::OrdersServiceError,
            records::{OrderRecord, OrderUuid},
            repository::{OrdersRepository, PgOrdersRepository},
        },
        paging::Page,
    },
};

#[derive(Clone)]
pub struct PgOrdersService {
    repository: Arc<dyn OrdersRepository>,
}

impl fmt::Debug for PgOrdersService {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("PgOrdersService").finish_non_exhaustive()
    }
}

impl PgOrdersService {
    #[must_use]
    pub fn new(db: Db) -> Self {
        Self::with_repository(Arc::new(PgOrdersRepository::new(db)))
    }

    #[must_use]
    pub fn with_repository(repository: Arc<dyn OrdersRepository>) -> Self {
        Self { repository }
    }
}

#[async_trait]
impl OrdersService for PgOrdersService {
    async fn list_orders(
        &self,
        owner: UserUuid,
        page: Page,
    ) -> Result<Vec<OrderRecord>, OrdersServiceError> {
        Ok(self.repository.list_orders_for_owner(owner, page).await?)
    }

    async fn get_order(
        &self,
        owner: UserUuid,
        order: OrderUuid,
    ) -> Result<OrderRecord, OrdersServiceError> {
        let found = self
            .repository
            .find_order(order)
            .await?
            .ok_or(OrdersServiceError::NotFound)?;

        if found.owner != owner {
            return Err(OrdersServiceError::Forbidden);
        }

        Ok(found)
    }

    async fn list_all_orders(&self, page: Page) -> Result<Vec<OrderRecord>, OrdersServiceError> {
        Ok(self.repository.list_all_orders(page).await?)
    }
}

#[automock]
#[async_trait]
pub trait OrdersService: Send + Sync {
    /// The user's own orders, newest first.
    async fn list_orders(
        &self,
        owner: UserUuid,
        page: Page,
    ) -> Result<Vec<OrderRecord>, OrdersServiceError>;

    /// A single order, only if `owner` placed it.
    async fn get_order(
        &self,
        owner: UserUuid,
        order: OrderUuid,
    ) -> Result<OrderRecord, OrdersServiceError>;

    /// Every user's orders, newest first.
    async fn list_all_orders(&self, page: Page) -> Result<Vec<OrderRecord>, OrdersServiceError>;
}

#[cfg(test)]
mod tests {
    use jiff::Timestamp;
    use mockall::predicate::eq;
    use rust_decimal::Decimal;
    use testresult::TestResult;

    use crate::domain::orders::{
        records::OrderStatus, repository::MockOrdersRepository,
    };

    use super::*;

    fn order(owner: UserUuid) -> OrderRecord {
        OrderRecord {
            uuid: OrderUuid::new(),
            owner,
            lines: Vec::new(),
            total: Decimal::new(5000, 2),
            currency: "usd".to_string(),
            status: OrderStatus::Pending,
            created_at: Timestamp::UNIX_EPOCH,
            updated_at: Timestamp::UNIX_EPOCH,
        }
    }

    #[tokio::test]
    async fn get_order_returns_own_order() -> TestResult {
        let owner = UserUuid::new();
        let expected = order(owner);
        let returned = expected.clone();

        let mut repository = MockOrdersRepository::new();

        repository
            .expect_find_order()
            .once()
            .with(eq(expected.uuid))
            .return_once(move |_| Ok(Some(returned)));

        let found = PgOrdersService::with_repository(Arc::new(repository))
            .get_order(owner, expected.uuid)
            .await?;

        assert_eq!(found, expected);

        Ok(())
    }

    #[tokio::test]
    async fn get_order_forbids_other_users() {
        let placed = order(UserUuid::new());
        let uuid = placed.uuid;

        let mut repository = MockOrdersRepository::new();

        repository
            .expect_find_order()
            .return_once(move |_| Ok(Some(placed)));

        let result = PgOrdersService::with_repository(Arc::new(repository))
            .get_order(UserUuid::new(), uuid)
            .await;

        assert!(
            matches!(result, Err(OrdersServiceError::Forbidden)),
            "expected Forbidden, got {result:?}"
        );
    }

    #[tokio::test]
    async fn get_order_reports_missing_order() {
        let mut repository = MockOrdersRepository::new();

        repository.expect_find_order().return_once(|_| Ok(None));

        let result = PgOrdersService::with_repository(Arc::new(repository))
            .get_order(UserUuid::new(), OrderUuid::new())
            .await;

        assert!(
            matches!(result, Err(OrdersServiceError::NotFound)),
            "expected NotFound, got {result:?}"
        );
    }

    #[tokio::test]
    async fn list_orders_scopes_to_owner() -> TestResult {
        let owner = UserUuid::new();
        let page = Page::new(0, 20);
        let orders = vec![order(owner), order(owner)];
        let returned = orders.clone();

        let mut repository = MockOrdersRepository::new();

        repository.expect_list_all_orders().never();
        repository
            .expect_list_orders_for_owner()
            .once()
            .with(eq(owner), eq(page))
            .return_once(move |_, _| Ok(returned));

        let listed = PgOrdersService::with_repository(Arc::new(repository))
            .list_orders(owner, page)
            .await?;

        assert_eq!(listed, orders);

        Ok(())
    }
}
