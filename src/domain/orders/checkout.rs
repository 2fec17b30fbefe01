//! Checkout.
//!
//! A checkout captures the cart, then writes the order, its lines, the payment
//! and the removal of the cart inside one [`OrderTransaction`]. Either all of
//! it commits and the in-memory cart is emptied, or none of it does and the
//! cart is left exactly as it was.

use std::{
    fmt::{Debug, Formatter, Result as FmtResult},
    sync::{Arc, Mutex, MutexGuard, PoisonError},
    time::Duration,
};

use rustc_hash::FxHashSet;
use tokio::time::{Instant, timeout_at};
use tracing::{debug, info, instrument, warn};

use crate::{
    domain::{
        carts::CartService,
        orders::{
            errors::CheckoutError,
            models::{OrderId, OrderLine, PaymentId, Receipt},
            store::{OrderStore, OrderTransaction},
        },
        users::UserId,
    },
    money::format_amount,
};

/// Default bound on how long a checkout transaction may stay open.
pub const DEFAULT_CHECKOUT_TIMEOUT: Duration = Duration::from_secs(10);

/// Lifecycle of a single checkout attempt.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CheckoutState {
    /// No checkout is open for the user.
    Idle,
    /// The transaction is open.
    InProgress,
    /// Everything was written and committed.
    Committed,
    /// Nothing was kept.
    RolledBack,
}

/// Point-in-time copy of a cart that becomes the order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CheckoutSnapshot {
    /// Whose cart this was.
    pub user: UserId,
    /// Cart total in minor units; charged as-is.
    pub amount: u64,
    /// Lines in cart order.
    pub lines: Vec<OrderLine>,
}

impl CheckoutSnapshot {
    /// Capture the cart's current lines and total.
    ///
    /// # Errors
    ///
    /// Returns [`CheckoutError::NoUserLoggedIn`] when no user is attached,
    /// [`CheckoutError::EmptyCart`] when the cart has no lines, or
    /// [`CheckoutError::TotalOverflow`] when the total does not fit in `u64`.
    pub fn capture(cart: &CartService) -> Result<Self, CheckoutError> {
        let user = cart.user().ok_or(CheckoutError::NoUserLoggedIn)?;

        if cart.is_empty() {
            return Err(CheckoutError::EmptyCart);
        }

        Ok(Self {
            user,
            amount: cart.total().ok_or(CheckoutError::TotalOverflow)?,
            lines: cart
                .lines()
                .iter()
                .map(|line| OrderLine {
                    product: line.product.id,
                    quantity: line.quantity,
                })
                .collect(),
        })
    }
}

/// Turns carts into orders, one checkout per user at a time.
#[derive(Clone)]
pub struct CheckoutService {
    orders: Arc<dyn OrderStore>,
    timeout: Duration,
    in_flight: Arc<Mutex<FxHashSet<UserId>>>,
}

impl Debug for CheckoutService {
    fn fmt(&self, f: &mut Formatter<'_>) -> FmtResult {
        f.debug_struct("CheckoutService")
            .field("timeout", &self.timeout)
            .field("in_flight", &lock(&self.in_flight).len())
            .finish_non_exhaustive()
    }
}

impl CheckoutService {
    /// A checkout service bounded by [`DEFAULT_CHECKOUT_TIMEOUT`].
    #[must_use]
    pub fn new(orders: Arc<dyn OrderStore>) -> Self {
        Self {
            orders,
            timeout: DEFAULT_CHECKOUT_TIMEOUT,
            in_flight: Arc::default(),
        }
    }

    /// Bound the checkout transaction by `timeout`.
    #[must_use]
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    /// The bound on begin, the writes and the commit together.
    #[must_use]
    pub fn timeout(&self) -> Duration {
        self.timeout
    }

    /// Whether a checkout for `user` is currently open.
    #[must_use]
    pub fn state(&self, user: UserId) -> CheckoutState {
        if lock(&self.in_flight).contains(&user) {
            CheckoutState::InProgress
        } else {
            CheckoutState::Idle
        }
    }

    /// Turn the cart into an order and a payment.
    ///
    /// On success the cart is empty in memory and in storage. On failure
    /// nothing was written and the cart is unchanged.
    ///
    /// # Errors
    ///
    /// Returns [`CheckoutError::NoUserLoggedIn`], [`CheckoutError::EmptyCart`]
    /// or [`CheckoutError::TotalOverflow`] before touching storage,
    /// [`CheckoutError::CheckoutInProgress`] when the user already has a
    /// checkout open, and the step-specific error when a write, the commit or
    /// the timeout fails.
    #[instrument(skip_all, fields(user = ?cart.user()))]
    pub async fn checkout(&self, cart: &mut CartService) -> Result<Receipt, CheckoutError> {
        let snapshot = CheckoutSnapshot::capture(cart)?;

        self.place_order(cart, &snapshot).await
    }

    /// Write and commit the order described by `snapshot`, then empty `cart`.
    ///
    /// `cart` may have changed since `snapshot` was captured; the order only
    /// reflects the snapshot. The stored cart is deleted inside the
    /// transaction, so the in-memory cart is emptied too once it commits.
    pub(crate) async fn place_order(
        &self,
        cart: &mut CartService,
        snapshot: &CheckoutSnapshot,
    ) -> Result<Receipt, CheckoutError> {
        let _in_flight = InFlight::enter(&self.in_flight, snapshot.user)?;

        // One deadline covers begin, every write and the commit.
        let deadline = Instant::now() + self.timeout;

        let mut tx = match timeout_at(deadline, self.orders.begin()).await {
            Ok(Ok(tx)) => tx,
            Ok(Err(error)) => return Err(CheckoutError::StorageUnavailable(error)),
            Err(_elapsed) => return Err(self.timed_out("begin")),
        };

        debug!(state = ?CheckoutState::InProgress, amount = snapshot.amount, "checkout started");

        let (order, payment) = match timeout_at(deadline, write_order(tx.as_mut(), snapshot)).await {
            Ok(Ok(ids)) => ids,
            Ok(Err(error)) => {
                roll_back(tx).await;

                warn!(state = ?CheckoutState::RolledBack, %error, "checkout failed");

                return Err(error);
            }
            Err(_elapsed) => {
                roll_back(tx).await;

                return Err(self.timed_out("write"));
            }
        };

        // An abandoned commit drops the transaction, which rolls it back.
        match timeout_at(deadline, tx.commit()).await {
            Ok(Ok(())) => {}
            Ok(Err(error)) => {
                warn!(state = ?CheckoutState::RolledBack, %error, "checkout commit failed");

                return Err(CheckoutError::CommitFailed(error));
            }
            Err(_elapsed) => return Err(self.timed_out("commit")),
        }

        cart.forget_cart();

        info!(
            state = ?CheckoutState::Committed,
            %order,
            %payment,
            amount = %format_amount(snapshot.amount),
            "checkout committed"
        );

        Ok(Receipt {
            order,
            payment,
            amount: snapshot.amount,
            lines: snapshot.lines.clone(),
        })
    }

    fn timed_out(&self, phase: &'static str) -> CheckoutError {
        warn!(state = ?CheckoutState::RolledBack, timeout = ?self.timeout, phase, "checkout timed out");

        CheckoutError::TimedOut(self.timeout)
    }
}

async fn write_order(
    tx: &mut dyn OrderTransaction,
    snapshot: &CheckoutSnapshot,
) -> Result<(OrderId, PaymentId), CheckoutError> {
    let order = tx
        .insert_order(snapshot.user, snapshot.amount)
        .await
        .map_err(CheckoutError::OrderCreationFailed)?;

    tx.insert_order_lines(order, &snapshot.lines)
        .await
        .map_err(CheckoutError::OrderLinesFailed)?;

    let payment = tx
        .insert_payment(order, snapshot.user, snapshot.amount)
        .await
        .map_err(CheckoutError::PaymentFailed)?;

    let cart = tx
        .active_cart(snapshot.user)
        .await
        .map_err(CheckoutError::CartCleanupFailed)?;

    if let Some(cart) = cart {
        tx.delete_cart(cart)
            .await
            .map_err(CheckoutError::CartCleanupFailed)?;
    }

    Ok((order, payment))
}

async fn roll_back(tx: Box<dyn OrderTransaction>) {
    if let Err(error) = tx.rollback().await {
        // The transaction is discarded when dropped either way.
        warn!(%error, "explicit rollback failed");
    }
}

/// Marks a user's checkout as open until dropped.
struct InFlight {
    users: Arc<Mutex<FxHashSet<UserId>>>,
    user: UserId,
}

impl InFlight {
    fn enter(users: &Arc<Mutex<FxHashSet<UserId>>>, user: UserId) -> Result<Self, CheckoutError> {
        if !lock(users).insert(user) {
            return Err(CheckoutError::CheckoutInProgress);
        }

        Ok(Self {
            users: Arc::clone(users),
            user,
        })
    }
}

impl Drop for InFlight {
    fn drop(&mut self) {
        lock(&self.users).remove(&self.user);
    }
}

fn lock(users: &Mutex<FxHashSet<UserId>>) -> MutexGuard<'_, FxHashSet<UserId>> {
    users.lock().unwrap_or_else(PoisonError::into_inner)
}
