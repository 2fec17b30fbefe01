//! Per-user cart sessions.
//!
//! A [`CartService`] takes `&mut self`, so a host serving several requests at
//! once keeps one behind an async mutex per user. Calls for the same user queue
//! up on that mutex; calls for different users never contend.

use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use rustc_hash::FxHashMap;
use tokio::sync::Mutex as AsyncMutex;
use tracing::debug;

use crate::{
    context::AppContext,
    domain::{
        carts::{CartError, CartService},
        orders::{CheckoutError, models::Receipt},
        users::UserId,
    },
};

/// A user's cart, shared by every caller acting for that user.
pub type SharedCart = Arc<AsyncMutex<CartService>>;

type SessionMap = FxHashMap<UserId, SharedCart>;

/// Open carts keyed by user.
#[derive(Debug, Clone)]
pub struct Sessions {
    app: AppContext,
    carts: Arc<Mutex<SessionMap>>,
}

impl Sessions {
    /// No sessions yet.
    #[must_use]
    pub fn new(app: AppContext) -> Self {
        Self {
            app,
            carts: Arc::default(),
        }
    }

    /// The user's session, loading their cart if none is open yet.
    ///
    /// # Errors
    ///
    /// Returns [`CartError::StorageUnavailable`] when the cart cannot be loaded.
    pub async fn open(&self, user: UserId) -> Result<SharedCart, CartError> {
        if let Some(cart) = self.lock().get(&user) {
            return Ok(Arc::clone(cart));
        }

        let mut service = self.app.cart_service();

        service.attach_user(user).await?;

        // Another caller may have opened the session while we were loading.
        let cart = self
            .lock()
            .entry(user)
            .or_insert_with(|| Arc::new(AsyncMutex::new(service)))
            .clone();

        debug!(%user, "session opened");

        Ok(cart)
    }

    /// The user's session if one is open.
    #[must_use]
    pub fn get(&self, user: UserId) -> Option<SharedCart> {
        self.lock().get(&user).cloned()
    }

    /// Forget the user's session. Callers still holding it keep using their
    /// copy; the next [`Sessions::open`] loads a new one.
    pub fn close(&self, user: UserId) -> bool {
        self.lock().remove(&user).is_some()
    }

    /// Check out the user's open cart.
    ///
    /// # Errors
    ///
    /// Returns [`CheckoutError::NoUserLoggedIn`] when the user has no open
    /// session, otherwise whatever [`crate::domain::orders::CheckoutService::checkout`]
    /// returns.
    pub async fn checkout(&self, user: UserId) -> Result<Receipt, CheckoutError> {
        let cart = self.get(user).ok_or(CheckoutError::NoUserLoggedIn)?;

        let mut cart = cart.lock().await;

        self.app.checkout.checkout(&mut cart).await
    }

    /// Number of open sessions.
    #[must_use]
    pub fn len(&self) -> usize {
        self.lock().len()
    }

    /// Whether no session is open.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.lock().is_empty()
    }

    fn lock(&self) -> MutexGuard<'_, SessionMap> {
        self.carts.lock().unwrap_or_else(PoisonError::into_inner)
    }
}
