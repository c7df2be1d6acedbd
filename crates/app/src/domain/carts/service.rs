//! Carts service.

use std::{fmt, sync::Arc};

use async_trait::async_trait;
use mockall::automock;
use tracing::debug;

use crate::{
    auth::UserUuid,
    database::Db,
    domain::{
        carts::{
            errors::CartsServiceError,
            records::CartRecord,
            repositories::{CartsRepository, PgCartsRepository},
        },
        products::repository::{PgProductsRepository, ProductsRepository},
    },
};

#[derive(Clone)]
pub struct PgCartsService {
    carts: Arc<dyn CartsRepository>,
    products: Arc<dyn ProductsRepository>,
}

impl fmt::Debug for PgCartsService {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("PgCartsService").finish_non_exhaustive()
    }
}

impl PgCartsService {
    #[must_use]
    pub fn new(db: Db) -> Self {
        Self::with_repositories(
            Arc::new(PgCartsRepository::new(db.clone())),
            Arc::new(PgProductsRepository::new(db)),
        )
    }

    #[must_use]
    pub fn with_repositories(
        carts: Arc<dyn CartsRepository>,
        products: Arc<dyn ProductsRepository>,
    ) -> Self {
        Self { carts, products }
    }
}

/// Quantities must be positive and fit the storage column.
fn validate_quantity(quantity: i64) -> Result<u32, CartsServiceError> {
    u32::try_from(quantity)
        .ok()
        .filter(|quantity| (1..=i32::MAX.unsigned_abs()).contains(quantity))
        .ok_or(CartsServiceError::InvalidQuantity)
}

#[async_trait]
impl CartsService for PgCartsService {
    async fn get_cart(&self, owner: UserUuid) -> Result<CartRecord, CartsServiceError> {
        Ok(self.carts.get_cart(owner).await?)
    }

    async fn add_item(
        &self,
        owner: UserUuid,
        catalog_id: i64,
        quantity: i64,
    ) -> Result<CartRecord, CartsServiceError> {
        let quantity = validate_quantity(quantity)?;

        self.products
            .find_by_catalog_id(catalog_id)
            .await?
            .filter(|product| product.is_active)
            .ok_or(CartsServiceError::ProductNotFound)?;

        let cart = self
            .carts
            .add_item(owner, catalog_id, quantity)
            .await?
            .ok_or(CartsServiceError::InvalidQuantity)?;

        debug!(owner = %owner, catalog_id, quantity, "added cart item");

        Ok(cart)
    }

    async fn remove_item(
        &self,
        owner: UserUuid,
        catalog_id: i64,
    ) -> Result<CartRecord, CartsServiceError> {
        self.carts
            .remove_item(owner, catalog_id)
            .await?
            .ok_or(CartsServiceError::ProductNotFound)
    }

    async fn clear_cart(&self, owner: UserUuid) -> Result<CartRecord, CartsServiceError> {
        Ok(self.carts.clear_cart(owner).await?)
    }
}

#[automock]
#[async_trait]
pub trait CartsService: Send + Sync {
    /// Retrieve the user's cart, creating it if needed.
    async fn get_cart(&self, owner: UserUuid) -> Result<CartRecord, CartsServiceError>;

    /// Add an active product to the cart.
    async fn add_item(
        &self,
        owner: UserUuid,
        catalog_id: i64,
        quantity: i64,
    ) -> Result<CartRecord, CartsServiceError>;

    /// Remove a product line from the cart.
    async fn remove_item(
        &self,
        owner: UserUuid,
        catalog_id: i64,
    ) -> Result<CartRecord, CartsServiceError>;

    /// Remove every line from the cart.
    async fn clear_cart(&self, owner: UserUuid) -> Result<CartRecord, CartsServiceError>;
}
