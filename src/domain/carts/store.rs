//! Persisted cart state.

use async_trait::async_trait;
use mockall::automock;

use crate::{
    database::Db,
    domain::{
        carts::{
            models::{CartId, CartSnapshot},
            repositories::{PgCartLinesRepository, PgCartsRepository},
        },
        products::models::ProductId,
        users::UserId,
    },
    errors::StorageError,
};

/// [`CartStore`] backed by `PostgreSQL`.
#[derive(Debug, Clone)]
pub struct PgCartStore {
    db: Db,
    carts_repository: PgCartsRepository,
    lines_repository: PgCartLinesRepository,
}

impl PgCartStore {
    /// A store over `db`.
    #[must_use]
    pub fn new(db: Db) -> Self {
        Self {
            db,
            carts_repository: PgCartsRepository::new(),
            lines_repository: PgCartLinesRepository::new(),
        }
    }
}

#[async_trait]
impl CartStore for PgCartStore {
    async fn load_active_cart(&self, user: UserId) -> Result<CartSnapshot, StorageError> {
        let mut tx = self.db.begin().await?;

        let Some(cart) = self.carts_repository.find_active_cart(&mut tx, user).await? else {
            tx.commit().await?;

            return Ok(CartSnapshot::empty());
        };

        let lines = self.lines_repository.get_cart_lines(&mut tx, cart).await?;

        tx.commit().await?;

        Ok(CartSnapshot {
            cart: Some(cart),
            lines,
        })
    }

    async fn create_cart(&self, user: UserId) -> Result<CartId, StorageError> {
        let mut tx = self.db.begin().await?;

        let cart = self.carts_repository.create_cart(&mut tx, user).await?;

        tx.commit().await?;

        Ok(cart)
    }

    async fn upsert_line(
        &self,
        cart: CartId,
        product: ProductId,
        quantity: u32,
    ) -> Result<(), StorageError> {
        let mut tx = self.db.begin().await?;

        self.lines_repository
            .upsert_line(&mut tx, cart, product, quantity)
            .await?;

        tx.commit().await?;

        Ok(())
    }

    async fn delete_line(&self, cart: CartId, product: ProductId) -> Result<(), StorageError> {
        let mut tx = self.db.begin().await?;

        self.lines_repository
            .delete_line(&mut tx, cart, product)
            .await?;

        tx.commit().await?;

        Ok(())
    }

    async fn delete_cart(&self, cart: CartId) -> Result<(), StorageError> {
        let mut tx = self.db.begin().await?;

        self.lines_repository.delete_cart_lines(&mut tx, cart).await?;
        self.carts_repository.delete_cart(&mut tx, cart).await?;

        tx.commit().await?;

        Ok(())
    }
}

/// Durable mirror of each user's active cart.
///
/// Every method is atomic on its own. Sequencing several calls (for example
/// creating a cart and then adding its first line) is up to the caller.
#[automock]
#[async_trait]
pub trait CartStore: Send + Sync {
    /// Load the user's active cart with product detail, or an empty snapshot when none exists.
    async fn load_active_cart(&self, user: UserId) -> Result<CartSnapshot, StorageError>;

    /// Allocate a cart for the user.
    async fn create_cart(&self, user: UserId) -> Result<CartId, StorageError>;

    /// Insert a line or overwrite its quantity with the final value.
    async fn upsert_line(
        &self,
        cart: CartId,
        product: ProductId,
        quantity: u32,
    ) -> Result<(), StorageError>;

    /// Delete one line. Deleting a missing line is not an error.
    async fn delete_line(&self, cart: CartId, product: ProductId) -> Result<(), StorageError>;

    /// Delete the cart row together with all of its lines.
    async fn delete_cart(&self, cart: CartId) -> Result<(), StorageError>;
}
