//! App Context

use std::sync::Arc;

use thiserror::Error;
use tracing::info;

use crate::{
    auth::{AuthService, DEFAULT_SESSION_TTL_MINUTES, PgAuthService},
    cache::{CacheSettings, ReadThroughCache},
    database::{self, Db},
    domain::{
        carts::{CartsService, PgCartsService},
        checkout::{CheckoutService, PgCheckoutService},
        orders::{OrdersService, PgOrdersService},
        payments::{PaymentsService, PgPaymentsService},
        products::{PgProductsService, ProductsService},
    },
};

#[derive(Debug, Error)]
pub enum AppInitError {
    #[error("failed to connect to database")]
    Database(#[source] sqlx::Error),

    #[error("failed to run database migrations")]
    Migrations(#[source] sqlx::migrate::MigrateError),
}

/// Everything needed to build an [`AppContext`] from scratch.
#[derive(Debug, Clone)]
pub struct AppConfig {
    pub database_url: String,
    pub max_connections: u32,
    pub run_migrations: bool,
    pub cache: CacheSettings,
    pub session_ttl_minutes: u32,
}

#[derive(Clone)]
pub struct AppContext {
    pub products: Arc<dyn ProductsService>,
    pub carts: Arc<dyn CartsService>,
    pub orders: Arc<dyn OrdersService>,
    pub checkout: Arc<dyn CheckoutService>,
    pub payments: Arc<dyn PaymentsService>,
    pub auth: Arc<dyn AuthService>,
}

impl std::fmt::Debug for AppContext {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AppContext").finish_non_exhaustive()
    }
}

impl AppContext {
    /// Wire every service against one database handle and one cache handle.
    #[must_use]
    pub fn new(db: Db, cache: ReadThroughCache) -> Self {
        Self::with_session_ttl(db, cache, DEFAULT_SESSION_TTL_MINUTES)
    }

    #[must_use]
    pub fn with_session_ttl(db: Db, cache: ReadThroughCache, session_ttl_minutes: u32) -> Self {
        Self {
            products: Arc::new(PgProductsService::new(db.clone(), cache.clone())),
            carts: Arc::new(PgCartsService::new(db.clone())),
            orders: Arc::new(PgOrdersService::new(db.clone())),
            checkout: Arc::new(PgCheckoutService::new(db.clone())),
            payments: Arc::new(PgPaymentsService::new(db.clone(), cache)),
            auth: Arc::new(PgAuthService::new(db, session_ttl_minutes)),
        }
    }

    /// Connect to the database, optionally migrate it, and build the context.
    ///
    /// # Errors
    ///
    /// Returns an error when establishing a database connection or migrating fails.
    pub async fn from_config(config: &AppConfig) -> Result<Self, AppInitError> {
        let pool = database::connect(&config.database_url, config.max_connections)
            .await
            .map_err(AppInitError::Database)?;

        if config.run_migrations {
            database::migrate(&pool)
                .await
                .map_err(AppInitError::Migrations)?;

            info!("database migrations applied");
        }

        Ok(Self::with_session_ttl(
            Db::new(pool),
            ReadThroughCache::from_settings(config.cache),
            config.session_ttl_minutes,
        ))
    }
}
