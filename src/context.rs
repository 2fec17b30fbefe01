//! App Context

use std::{sync::Arc, time::Duration};

use thiserror::Error;

use crate::{
    database::{self, Db},
    domain::{
        carts::{CartService, CartStore, PgCartStore},
        orders::{CheckoutService, OrderStore, PgOrderStore},
        products::{Catalog, PgCatalog},
    },
};

/// Why the application context could not be built.
#[derive(Debug, Error)]
pub enum AppInitError {
    /// The pool could not connect.
    #[error("failed to connect to database")]
    Database(#[source] sqlx::Error),

    /// A schema migration failed.
    #[error("failed to apply migrations")]
    Migrations(#[source] sqlx::migrate::MigrateError),
}

/// The wired-up services a front end needs.
#[derive(Clone)]
pub struct AppContext {
    /// Read-only product catalog.
    pub catalog: Arc<dyn Catalog>,
    /// Storage shared by every cart service.
    pub carts: Arc<dyn CartStore>,
    /// Order and payment storage.
    pub orders: Arc<dyn OrderStore>,
    /// The one checkout service, so in-flight checkouts are tracked across carts.
    pub checkout: CheckoutService,
}

impl std::fmt::Debug for AppContext {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AppContext")
            .field("checkout", &self.checkout)
            .finish_non_exhaustive()
    }
}

impl AppContext {
    /// Build application context from a database URL.
    ///
    /// # Errors
    ///
    /// Returns an error when establishing a database connection fails.
    pub async fn from_database_url(
        url: &str,
        checkout_timeout: Duration,
    ) -> Result<Self, AppInitError> {
        let pool = database::connect(url)
            .await
            .map_err(AppInitError::Database)?;

        Ok(Self::from_db(&Db::new(pool), checkout_timeout))
    }

    /// Build application context over an existing pool.
    #[must_use]
    pub fn from_db(db: &Db, checkout_timeout: Duration) -> Self {
        Self::new(
            Arc::new(PgCatalog::new(db.clone())),
            Arc::new(PgCartStore::new(db.clone())),
            Arc::new(PgOrderStore::new(db.clone())),
            checkout_timeout,
        )
    }

    /// Wire the given stores together.
    #[must_use]
    pub fn new(
        catalog: Arc<dyn Catalog>,
        carts: Arc<dyn CartStore>,
        orders: Arc<dyn OrderStore>,
        checkout_timeout: Duration,
    ) -> Self {
        Self {
            checkout: CheckoutService::new(Arc::clone(&orders)).with_timeout(checkout_timeout),
            catalog,
            carts,
            orders,
        }
    }

    /// A fresh cart service with no user attached.
    #[must_use]
    pub fn cart_service(&self) -> CartService {
        CartService::new(Arc::clone(&self.carts), Arc::clone(&self.catalog))
    }
}

/// Connect and bring the schema up to date.
///
/// # Errors
///
/// Returns an error when the connection or a migration fails.
pub async fn migrate_database(url: &str) -> Result<(), AppInitError> {
    let pool = database::connect(url)
        .await
        .map_err(AppInitError::Database)?;

    database::migrate(&pool)
        .await
        .map_err(AppInitError::Migrations)
}
