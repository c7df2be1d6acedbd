//! Checkout service.

use std::{fmt, sync::Arc};

use async_trait::async_trait;
use mockall::automock;
use rust_decimal::Decimal;
use tracing::info;

use crate::{
    auth::UserUuid,
    database::Db,
    domain::{
        carts::{
            records::CartRecord,
            repositories::{CartsRepository, PgCartsRepository},
        },
        checkout::errors::CheckoutServiceError,
        orders::{
            ORDER_CURRENCY,
            data::NewOrder,
            records::{OrderLineRecord, OrderRecord, OrderUuid},
            repository::{OrdersRepository, PgOrdersRepository},
        },
        products::repository::{PgProductsRepository, ProductsRepository},
    },
};

#[derive(Clone)]
pub struct PgCheckoutService {
    carts: Arc<dyn CartsRepository>,
    products: Arc<dyn ProductsRepository>,
    orders: Arc<dyn OrdersRepository>,
}

impl fmt::Debug for PgCheckoutService {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("PgCheckoutService").finish_non_exhaustive()
    }
}

impl PgCheckoutService {
    #[must_use]
    pub fn new(db: Db) -> Self {
        Self::with_repositories(
            Arc::new(PgCartsRepository::new(db.clone())),
            Arc::new(PgProductsRepository::new(db.clone())),
            Arc::new(PgOrdersRepository::new(db)),
        )
    }

    #[must_use]
    pub fn with_repositories(
        carts: Arc<dyn CartsRepository>,
        products: Arc<dyn ProductsRepository>,
        orders: Arc<dyn OrdersRepository>,
    ) -> Self {
        Self {
            carts,
            products,
            orders,
        }
    }

    /// Price every cart line from the current catalog. Fails on the first missing or inactive
    /// product, before anything is written.
    async fn price_lines(
        &self,
        cart: &CartRecord,
    ) -> Result<Vec<OrderLineRecord>, CheckoutServiceError> {
        let mut lines = Vec::with_capacity(cart.items.len());

        for item in &cart.items {
            let product = self
                .products
                .find_by_catalog_id(item.catalog_id)
                .await?
                .filter(|product| product.is_active)
                .ok_or(CheckoutServiceError::ItemUnavailable {
                    catalog_id: item.catalog_id,
                })?;

            lines.push(OrderLineRecord {
                product_ref: product.uuid,
                catalog_id: product.catalog_id,
                line_total: product.price * Decimal::from(item.quantity),
                name: product.name,
                unit_price: product.price,
                quantity: item.quantity,
            });
        }

        Ok(lines)
    }
}

#[async_trait]
impl CheckoutService for PgCheckoutService {
    async fn create_order_from_cart(
        &self,
        owner: UserUuid,
    ) -> Result<OrderRecord, CheckoutServiceError> {
        let cart = self.carts.get_cart(owner).await?;

        if cart.is_empty() {
            return Err(CheckoutServiceError::EmptyCart);
        }

        let lines = self.price_lines(&cart).await?;
        let total: Decimal = lines.iter().map(|line| line.line_total).sum();

        let order = self
            .orders
            .place_order(&NewOrder {
                uuid: OrderUuid::new(),
                owner,
                lines,
                total,
                currency: ORDER_CURRENCY.to_string(),
            })
            .await?;

        info!(
            order = %order.uuid,
            owner = %owner,
            lines = order.lines.len(),
            total = %order.total,
            "placed order"
        );

        Ok(order)
    }
}

#[automock]
#[async_trait]
pub trait CheckoutService: Send + Sync {
    /// Turn the user's cart into a pending order and remove the ordered lines from the cart.
    async fn create_order_from_cart(
        &self,
        owner: UserUuid,
    ) -> Result<OrderRecord, CheckoutServiceError>;
}
