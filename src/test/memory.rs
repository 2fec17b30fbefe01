//! In-memory storage with failure injection.
//!
//! `MemoryStore` implements [`Catalog`], [`CartStore`] and [`OrderStore`] over
//! one shared set of tables so service tests can run without a database and
//! then inspect exactly what was persisted.

use std::{
    collections::BTreeMap,
    sync::{Arc, Mutex, MutexGuard, PoisonError},
    time::Duration,
};

use async_trait::async_trait;
use jiff::Timestamp;
use rustc_hash::{FxHashMap, FxHashSet};
use tokio::time::sleep;

use crate::{
    domain::{
        carts::{
            CartService, CartStore,
            models::{CartId, CartLine, CartSnapshot},
        },
        orders::{
            CheckoutService, OrderStore, OrderTransaction,
            models::{Order, OrderId, OrderLine, Payment, PaymentId},
        },
        products::{
            Catalog, CatalogError,
            models::{Product, ProductId},
        },
        users::UserId,
    },
    errors::StorageError,
};

/// A storage operation that can be made to fail or stall.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub(crate) enum Fault {
    Catalog,
    LoadCart,
    CreateCart,
    UpsertLine,
    DeleteLine,
    DeleteCart,
    Begin,
    InsertOrder,
    InsertOrderLines,
    InsertPayment,
    CleanUpCart,
    Commit,
}

#[derive(Debug, Clone, Default)]
struct Tables {
    next_id: i64,
    products: BTreeMap<ProductId, Product>,
    carts: Vec<(CartId, UserId)>,
    cart_lines: Vec<(CartId, ProductId, u32)>,
    orders: Vec<Order>,
    payments: Vec<Payment>,
}

impl Tables {
    fn next_id(&mut self) -> i64 {
        self.next_id += 1;
        self.next_id
    }

    fn active_cart(&self, user: UserId) -> Option<CartId> {
        self.carts
            .iter()
            .filter(|(_, owner)| *owner == user)
            .map(|(cart, _)| *cart)
            .max()
    }

    fn remove_cart(&mut self, cart: CartId) {
        self.cart_lines.retain(|(owner, _, _)| *owner != cart);
        self.carts.retain(|(id, _)| *id != cart);
    }
}

#[derive(Debug, Default)]
struct Shared {
    tables: Tables,
    failing: FxHashSet<Fault>,
    stalls: FxHashMap<Fault, Duration>,
    transactions_begun: usize,
    open_transactions: usize,
}

#[derive(Debug, Clone, Default)]
pub(crate) struct MemoryStore {
    shared: Arc<Mutex<Shared>>,
}

impl MemoryStore {
    pub(crate) fn new() -> Self {
        Self::default()
    }

    fn lock(&self) -> MutexGuard<'_, Shared> {
        lock(&self.shared)
    }

    pub(crate) fn add_product(&self, name: &str, price: u64) -> Product {
        let mut shared = self.lock();
        let id = ProductId::from_i64(shared.tables.next_id());

        let product = Product {
            id,
            name: name.to_string(),
            price,
            description: format!("{name} eau de parfum"),
        };

        shared.tables.products.insert(id, product.clone());

        product
    }

    /// A detached cart service backed by this store.
    pub(crate) fn cart_service(&self) -> CartService {
        CartService::new(Arc::new(self.clone()), self.catalog())
    }

    pub(crate) fn catalog(&self) -> Arc<dyn Catalog> {
        Arc::new(self.clone())
    }

    pub(crate) fn checkout_service(&self) -> CheckoutService {
        CheckoutService::new(Arc::new(self.clone()))
    }

    /// Make every call of `fault` fail until healed.
    pub(crate) fn fail(&self, fault: Fault) {
        self.lock().failing.insert(fault);
    }

    pub(crate) fn heal(&self, fault: Fault) {
        let mut shared = self.lock();

        shared.failing.remove(&fault);
        shared.stalls.remove(&fault);
    }

    /// Delay every call of `fault` by `delay` before it runs.
    pub(crate) fn stall(&self, fault: Fault, delay: Duration) {
        self.lock().stalls.insert(fault, delay);
    }

    /// Product and quantity of each stored line of the user's active cart.
    pub(crate) fn persisted_lines(&self, user: UserId) -> Vec<(ProductId, u32)> {
        let shared = self.lock();

        let Some(cart) = shared.tables.active_cart(user) else {
            return Vec::new();
        };

        shared
            .tables
            .cart_lines
            .iter()
            .filter(|(owner, _, _)| *owner == cart)
            .map(|(_, product, quantity)| (*product, *quantity))
            .collect()
    }

    pub(crate) fn cart_count(&self, user: UserId) -> usize {
        self.lock()
            .tables
            .carts
            .iter()
            .filter(|(_, owner)| *owner == user)
            .count()
    }

    /// Delete every stored cart behind the services' backs.
    pub(crate) fn drop_carts(&self) {
        let mut shared = self.lock();

        shared.tables.carts.clear();
        shared.tables.cart_lines.clear();
    }

    pub(crate) fn order_count(&self) -> usize {
        self.lock().tables.orders.len()
    }

    pub(crate) fn order_line_count(&self) -> usize {
        self.lock()
            .tables
            .orders
            .iter()
            .map(|order| order.lines.len())
            .sum()
    }

    pub(crate) fn payment_count(&self) -> usize {
        self.lock().tables.payments.len()
    }

    /// Calls to [`OrderStore::begin`], including failed ones.
    pub(crate) fn transactions_begun(&self) -> usize {
        self.lock().transactions_begun
    }

    /// Transactions that have been opened and not yet dropped.
    pub(crate) fn open_transactions(&self) -> usize {
        self.lock().open_transactions
    }
}

fn lock(shared: &Mutex<Shared>) -> MutexGuard<'_, Shared> {
    shared.lock().unwrap_or_else(PoisonError::into_inner)
}

/// Apply any stall, then fail if `fault` is armed.
async fn check(shared: &Mutex<Shared>, fault: Fault) -> Result<(), StorageError> {
    let stall = lock(shared).stalls.get(&fault).copied();

    if let Some(delay) = stall {
        sleep(delay).await;
    }

    if lock(shared).failing.contains(&fault) {
        return Err(StorageError::Unavailable(format!("injected {fault:?} failure")));
    }

    Ok(())
}

#[async_trait]
impl Catalog for MemoryStore {
    async fn list_all(&self) -> Result<Vec<Product>, CatalogError> {
        check(&self.shared, Fault::Catalog).await?;

        Ok(self.lock().tables.products.values().cloned().collect())
    }

    async fn find_by_id(&self, id: ProductId) -> Result<Option<Product>, CatalogError> {
        check(&self.shared, Fault::Catalog).await?;

        Ok(self.lock().tables.products.get(&id).cloned())
    }
}

#[async_trait]
impl CartStore for MemoryStore {
    async fn load_active_cart(&self, user: UserId) -> Result<CartSnapshot, StorageError> {
        check(&self.shared, Fault::LoadCart).await?;

        let shared = self.lock();
        let tables = &shared.tables;

        let Some(cart) = tables.active_cart(user) else {
            return Ok(CartSnapshot::empty());
        };

        let lines = tables
            .cart_lines
            .iter()
            .filter(|(owner, _, _)| *owner == cart)
            .filter_map(|(_, product, quantity)| {
                tables.products.get(product).map(|product| CartLine {
                    product: product.clone(),
                    quantity: *quantity,
                })
            })
            .collect();

        Ok(CartSnapshot {
            cart: Some(cart),
            lines,
        })
    }

    async fn create_cart(&self, user: UserId) -> Result<CartId, StorageError> {
        check(&self.shared, Fault::CreateCart).await?;

        let mut shared = self.lock();

        if let Some(cart) = shared.tables.active_cart(user) {
            return Ok(cart);
        }

        let cart = CartId::from_i64(shared.tables.next_id());

        shared.tables.carts.push((cart, user));

        Ok(cart)
    }

    async fn upsert_line(
        &self,
        cart: CartId,
        product: ProductId,
        quantity: u32,
    ) -> Result<(), StorageError> {
        check(&self.shared, Fault::UpsertLine).await?;

        if quantity == 0 {
            return Err(StorageError::InvalidData);
        }

        let mut shared = self.lock();
        let tables = &mut shared.tables;

        if !tables.carts.iter().any(|(id, _)| *id == cart)
            || !tables.products.contains_key(&product)
        {
            return Err(StorageError::InvalidReference);
        }

        match tables
            .cart_lines
            .iter_mut()
            .find(|(owner, id, _)| *owner == cart && *id == product)
        {
            Some(line) => line.2 = quantity,
            None => tables.cart_lines.push((cart, product, quantity)),
        }

        Ok(())
    }

    async fn delete_line(&self, cart: CartId, product: ProductId) -> Result<(), StorageError> {
        check(&self.shared, Fault::DeleteLine).await?;

        self.lock()
            .tables
            .cart_lines
            .retain(|(owner, id, _)| !(*owner == cart && *id == product));

        Ok(())
    }

    async fn delete_cart(&self, cart: CartId) -> Result<(), StorageError> {
        check(&self.shared, Fault::DeleteCart).await?;

        self.lock().tables.remove_cart(cart);

        Ok(())
    }
}

#[async_trait]
impl OrderStore for MemoryStore {
    async fn begin(&self) -> Result<Box<dyn OrderTransaction>, StorageError> {
        self.lock().transactions_begun += 1;

        check(&self.shared, Fault::Begin).await?;

        let mut shared = self.lock();

        shared.open_transactions += 1;

        Ok(Box::new(MemoryTransaction {
            shared: Arc::clone(&self.shared),
            staged: shared.tables.clone(),
        }))
    }

    async fn get_order(&self, order: OrderId) -> Result<Order, StorageError> {
        self.lock()
            .tables
            .orders
            .iter()
            .find(|found| found.id == order)
            .cloned()
            .ok_or(StorageError::NotFound)
    }

    async fn get_payment_for_order(&self, order: OrderId) -> Result<Payment, StorageError> {
        self.lock()
            .tables
            .payments
            .iter()
            .find(|payment| payment.order == order)
            .cloned()
            .ok_or(StorageError::NotFound)
    }
}

/// Writes go to a private copy of the tables that replaces the shared ones on
/// commit. Concurrent transactions are not merged; the last commit wins.
#[derive(Debug)]
struct MemoryTransaction {
    shared: Arc<Mutex<Shared>>,
    staged: Tables,
}

impl Drop for MemoryTransaction {
    fn drop(&mut self) {
        lock(&self.shared).open_transactions -= 1;
    }
}

#[async_trait]
impl OrderTransaction for MemoryTransaction {
    async fn insert_order(&mut self, user: UserId, amount: u64) -> Result<OrderId, StorageError> {
        check(&self.shared, Fault::InsertOrder).await?;

        let id = OrderId::from_i64(self.staged.next_id());

        self.staged.orders.push(Order {
            id,
            user,
            amount,
            lines: Vec::new(),
            created_at: Timestamp::now(),
        });

        Ok(id)
    }

    async fn insert_order_lines(
        &mut self,
        order: OrderId,
        lines: &[OrderLine],
    ) -> Result<(), StorageError> {
        check(&self.shared, Fault::InsertOrderLines).await?;

        let found = self
            .staged
            .orders
            .iter_mut()
            .find(|found| found.id == order)
            .ok_or(StorageError::InvalidReference)?;

        found.lines.extend_from_slice(lines);

        Ok(())
    }

    async fn insert_payment(
        &mut self,
        order: OrderId,
        user: UserId,
        amount: u64,
    ) -> Result<PaymentId, StorageError> {
        check(&self.shared, Fault::InsertPayment).await?;

        if self.staged.payments.iter().any(|payment| payment.order == order) {
            return Err(StorageError::AlreadyExists);
        }

        let id = PaymentId::from_i64(self.staged.next_id());

        self.staged.payments.push(Payment {
            id,
            order,
            user,
            amount,
            created_at: Timestamp::now(),
        });

        Ok(id)
    }

    async fn active_cart(&mut self, user: UserId) -> Result<Option<CartId>, StorageError> {
        Ok(self.staged.active_cart(user))
    }

    async fn delete_cart(&mut self, cart: CartId) -> Result<(), StorageError> {
        check(&self.shared, Fault::CleanUpCart).await?;

        self.staged.remove_cart(cart);

        Ok(())
    }

    async fn commit(self: Box<Self>) -> Result<(), StorageError> {
        check(&self.shared, Fault::Commit).await?;

        let staged = self.staged.clone();

        lock(&self.shared).tables = staged;

        Ok(())
    }

    async fn rollback(self: Box<Self>) -> Result<(), StorageError> {
        Ok(())
    }
}
