//! Order persistence.

use async_trait::async_trait;
use sqlx::{Postgres, Transaction};

use crate::{
    database::Db,
    domain::{
        carts::{
            models::CartId,
            repositories::{PgCartLinesRepository, PgCartsRepository},
        },
        orders::{
            models::{Order, OrderId, OrderLine, Payment, PaymentId},
            repositories::{PgOrderLinesRepository, PgOrdersRepository, PgPaymentsRepository},
        },
        users::UserId,
    },
    errors::StorageError,
};

/// Storage for orders and payments.
#[async_trait]
pub trait OrderStore: Send + Sync {
    /// Open a transaction for a checkout.
    async fn begin(&self) -> Result<Box<dyn OrderTransaction>, StorageError>;

    /// Retrieve a committed order with its lines.
    async fn get_order(&self, order: OrderId) -> Result<Order, StorageError>;

    /// Retrieve the payment recorded for an order.
    async fn get_payment_for_order(&self, order: OrderId) -> Result<Payment, StorageError>;
}

/// One open checkout transaction.
///
/// Nothing written through it is visible to anyone else until
/// [`OrderTransaction::commit`]. Dropping it without committing discards every
/// write.
#[async_trait]
pub trait OrderTransaction: Send {
    /// Insert the order header and return its generated id.
    async fn insert_order(&mut self, user: UserId, amount: u64) -> Result<OrderId, StorageError>;

    /// Insert every order line in one batch.
    async fn insert_order_lines(
        &mut self,
        order: OrderId,
        lines: &[OrderLine],
    ) -> Result<(), StorageError>;

    /// Record the payment for an order.
    async fn insert_payment(
        &mut self,
        order: OrderId,
        user: UserId,
        amount: u64,
    ) -> Result<PaymentId, StorageError>;

    /// The user's active cart as seen inside this transaction.
    async fn active_cart(&mut self, user: UserId) -> Result<Option<CartId>, StorageError>;

    /// Delete a cart and its lines.
    async fn delete_cart(&mut self, cart: CartId) -> Result<(), StorageError>;

    /// Make every write visible atomically.
    async fn commit(self: Box<Self>) -> Result<(), StorageError>;

    /// Discard every write.
    async fn rollback(self: Box<Self>) -> Result<(), StorageError>;
}

/// [`OrderStore`] backed by `PostgreSQL`.
#[derive(Debug, Clone)]
pub struct PgOrderStore {
    db: Db,
    repositories: PgOrderRepositories,
}

impl PgOrderStore {
    /// A store over `db`.
    #[must_use]
    pub fn new(db: Db) -> Self {
        Self {
            db,
            repositories: PgOrderRepositories {
                orders: PgOrdersRepository::new(),
                order_lines: PgOrderLinesRepository::new(),
                payments: PgPaymentsRepository::new(),
                carts: PgCartsRepository::new(),
                cart_lines: PgCartLinesRepository::new(),
            },
        }
    }
}

#[derive(Debug, Clone)]
struct PgOrderRepositories {
    orders: PgOrdersRepository,
    order_lines: PgOrderLinesRepository,
    payments: PgPaymentsRepository,
    carts: PgCartsRepository,
    cart_lines: PgCartLinesRepository,
}

#[async_trait]
impl OrderStore for PgOrderStore {
    async fn begin(&self) -> Result<Box<dyn OrderTransaction>, StorageError> {
        let tx = self.db.begin().await?;

        Ok(Box::new(PgOrderTransaction {
            tx,
            repositories: self.repositories.clone(),
        }))
    }

    async fn get_order(&self, order: OrderId) -> Result<Order, StorageError> {
        let mut tx = self.db.begin().await?;

        let mut found = self.repositories.orders.get_order(&mut tx, order).await?;

        let lines = self
            .repositories
            .order_lines
            .get_order_lines(&mut tx, order)
            .await?;

        tx.commit().await?;

        found.lines.extend(lines);

        Ok(found)
    }

    async fn get_payment_for_order(&self, order: OrderId) -> Result<Payment, StorageError> {
        let mut tx = self.db.begin().await?;

        let payment = self
            .repositories
            .payments
            .get_payment_for_order(&mut tx, order)
            .await?;

        tx.commit().await?;

        Ok(payment)
    }
}

/// Checkout transaction over a single `PostgreSQL` transaction.
struct PgOrderTransaction {
    tx: Transaction<'static, Postgres>,
    repositories: PgOrderRepositories,
}

#[async_trait]
impl OrderTransaction for PgOrderTransaction {
    async fn insert_order(&mut self, user: UserId, amount: u64) -> Result<OrderId, StorageError> {
        let order = self
            .repositories
            .orders
            .create_order(&mut self.tx, user, amount)
            .await?;

        Ok(order)
    }

    async fn insert_order_lines(
        &mut self,
        order: OrderId,
        lines: &[OrderLine],
    ) -> Result<(), StorageError> {
        self.repositories
            .order_lines
            .create_order_lines(&mut self.tx, order, lines)
            .await?;

        Ok(())
    }

    async fn insert_payment(
        &mut self,
        order: OrderId,
        user: UserId,
        amount: u64,
    ) -> Result<PaymentId, StorageError> {
        let payment = self
            .repositories
            .payments
            .create_payment(&mut self.tx, order, user, amount)
            .await?;

        Ok(payment)
    }

    async fn active_cart(&mut self, user: UserId) -> Result<Option<CartId>, StorageError> {
        let cart = self
            .repositories
            .carts
            .find_active_cart(&mut self.tx, user)
            .await?;

        Ok(cart)
    }

    async fn delete_cart(&mut self, cart: CartId) -> Result<(), StorageError> {
        self.repositories
            .cart_lines
            .delete_cart_lines(&mut self.tx, cart)
            .await?;

        self.repositories
            .carts
            .delete_cart(&mut self.tx, cart)
            .await?;

        Ok(())
    }

    async fn commit(self: Box<Self>) -> Result<(), StorageError> {
        let this = *self;

        this.tx.commit().await?;

        Ok(())
    }

    async fn rollback(self: Box<Self>) -> Result<(), StorageError> {
        let this = *self;

        this.tx.rollback().await?;

        Ok(())
    }
}
