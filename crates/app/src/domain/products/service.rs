//! Products service.

use std::sync::Arc;

use async_trait::async_trait;
use mockall::automock;
use rust_decimal::Decimal;
use tracing::info;

use crate::{
    cache::ReadThroughCache,
    database::Db,
    domain::{
        paging::Page,
        products::{
            data::{NewProduct, ProductQuery, ProductUpdate},
            errors::ProductsServiceError,
            keys::{LIST_PATTERN, PRODUCTS_NAMESPACE, list_key, slug_key},
            records::{ProductRecord, ProductUuid},
            repository::{PgProductsRepository, ProductsRepository},
        },
    },
};

#[derive(Clone)]
pub struct PgProductsService {
    repository: Arc<dyn ProductsRepository>,
    cache: ReadThroughCache,
}

impl std::fmt::Debug for PgProductsService {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PgProductsService")
            .field("cache", &self.cache)
            .finish_non_exhaustive()
    }
}

impl PgProductsService {
    #[must_use]
    pub fn new(db: Db, cache: ReadThroughCache) -> Self {
        Self::with_repository(Arc::new(PgProductsRepository::new(db)), cache)
    }

    #[must_use]
    pub fn with_repository(
        repository: Arc<dyn ProductsRepository>,
        cache: ReadThroughCache,
    ) -> Self {
        Self { repository, cache }
    }

    async fn ensure_slug_available(
        &self,
        slug: &str,
        owner: Option<ProductUuid>,
    ) -> Result<(), ProductsServiceError> {
        match self.repository.find_by_slug(slug).await? {
            Some(existing) if Some(existing.uuid) != owner => {
                Err(ProductsServiceError::DuplicateSlug)
            }
            _ => Ok(()),
        }
    }

    async fn ensure_catalog_id_available(
        &self,
        catalog_id: i64,
        owner: Option<ProductUuid>,
    ) -> Result<(), ProductsServiceError> {
        match self.repository.find_by_catalog_id(catalog_id).await? {
            Some(existing) if Some(existing.uuid) != owner => {
                Err(ProductsServiceError::DuplicateCatalogId)
            }
            _ => Ok(()),
        }
    }

    async fn invalidate(&self, slugs: &[&str]) {
        for slug in slugs {
            self.cache
                .invalidate(PRODUCTS_NAMESPACE, &slug_key(slug))
                .await;
        }

        self.cache
            .invalidate_matching(PRODUCTS_NAMESPACE, LIST_PATTERN)
            .await;
    }
}

fn ensure_positive_price(price: Decimal) -> Result<(), ProductsServiceError> {
    if price <= Decimal::ZERO {
        return Err(ProductsServiceError::InvalidData);
    }

    Ok(())
}

#[async_trait]
impl ProductsService for PgProductsService {
    async fn list_products(
        &self,
        query: ProductQuery,
        page: Page,
    ) -> Result<Vec<ProductRecord>, ProductsServiceError> {
        let Some(key) = list_key(&query, page) else {
            return Ok(self.repository.list_products(&query, page).await?);
        };

        if let Some(products) = self.cache.fetch(PRODUCTS_NAMESPACE, &key).await {
            return Ok(products);
        }

        let products = self.repository.list_products(&query, page).await?;

        self.cache.store(PRODUCTS_NAMESPACE, &key, &products).await;

        Ok(products)
    }

    async fn get_product_by_slug(&self, slug: &str) -> Result<ProductRecord, ProductsServiceError> {
        let key = slug_key(slug);

        if let Some(product) = self.cache.fetch(PRODUCTS_NAMESPACE, &key).await {
            return Ok(product);
        }

        let product = self
            .repository
            .find_by_slug(slug)
            .await?
            .filter(|product| product.is_active)
            .ok_or(ProductsServiceError::NotFound)?;

        self.cache.store(PRODUCTS_NAMESPACE, &key, &product).await;

        Ok(product)
    }

    async fn get_product(&self, product: ProductUuid) -> Result<ProductRecord, ProductsServiceError> {
        self.repository
            .find_product(product)
            .await?
            .ok_or(ProductsServiceError::NotFound)
    }

    async fn create_product(
        &self,
        product: NewProduct,
    ) -> Result<ProductRecord, ProductsServiceError> {
        ensure_positive_price(product.price)?;

        self.ensure_slug_available(&product.slug, None).await?;
        self.ensure_catalog_id_available(product.catalog_id, None)
            .await?;

        let created = self.repository.create_product(&product).await?;

        self.invalidate(&[created.slug.as_str()]).await;

        info!(product_uuid = %created.uuid, catalog_id = created.catalog_id, "created product");

        Ok(created)
    }

    async fn update_product(
        &self,
        product: ProductUuid,
        update: ProductUpdate,
    ) -> Result<ProductRecord, ProductsServiceError> {
        ensure_positive_price(update.price)?;

        let existing = self
            .repository
            .find_product(product)
            .await?
            .ok_or(ProductsServiceError::NotFound)?;

        if update.slug != existing.slug {
            self.ensure_slug_available(&update.slug, Some(product))
                .await?;
        }

        if update.catalog_id != existing.catalog_id {
            self.ensure_catalog_id_available(update.catalog_id, Some(product))
                .await?;
        }

        let updated = self
            .repository
            .update_product(product, &update)
            .await?
            .ok_or(ProductsServiceError::NotFound)?;

        if updated.slug == existing.slug {
            self.invalidate(&[existing.slug.as_str()]).await;
        } else {
            self.invalidate(&[existing.slug.as_str(), updated.slug.as_str()]).await;
        }

        info!(product_uuid = %product, "updated product");

        Ok(updated)
    }

    async fn delete_product(
        &self,
        product: ProductUuid,
    ) -> Result<ProductRecord, ProductsServiceError> {
        let deleted = self
            .repository
            .delete_product(product)
            .await?
            .ok_or(ProductsServiceError::NotFound)?;

        self.invalidate(&[deleted.slug.as_str()]).await;

        info!(product_uuid = %product, "deleted product");

        Ok(deleted)
    }
}

#[automock]
#[async_trait]
pub trait ProductsService: Send + Sync {
    /// Lists products matching a query, served from cache when possible.
    async fn list_products(
        &self,
        query: ProductQuery,
        page: Page,
    ) -> Result<Vec<ProductRecord>, ProductsServiceError>;

    /// Retrieve an active product by slug, served from cache when possible.
    async fn get_product_by_slug(&self, slug: &str) -> Result<ProductRecord, ProductsServiceError>;

    /// Retrieve any product by UUID, bypassing the cache.
    async fn get_product(&self, product: ProductUuid) -> Result<ProductRecord, ProductsServiceError>;

    /// Creates a new product.
    async fn create_product(
        &self,
        product: NewProduct,
    ) -> Result<ProductRecord, ProductsServiceError>;

    /// Replaces every field of a product.
    async fn update_product(
        &self,
        product: ProductUuid,
        update: ProductUpdate,
    ) -> Result<ProductRecord, ProductsServiceError>;

    /// Deletes a product, returning what was removed.
    async fn delete_product(
        &self,
        product: ProductUuid,
    ) -> Result<ProductRecord, ProductsServiceError>;
}
