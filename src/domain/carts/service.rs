//! Carts service.
//!
//! [`CartService`] keeps an in-memory copy of the current user's cart and
//! writes every change through to a [`CartStore`]. Storage is written first;
//! memory only changes once the store has accepted the write, so a failed call
//! leaves both sides as they were. [`CartService::clear`] is the one exception
//! and is documented there.

use std::{
    fmt::{Debug, Formatter, Result as FmtResult},
    sync::Arc,
};

use tracing::{debug, instrument, warn};

use crate::domain::{
    carts::{
        errors::CartError,
        models::{CartId, CartLine, CartSnapshot},
        store::CartStore,
    },
    products::{
        Catalog,
        models::{Product, ProductId},
    },
    users::UserId,
};

/// What [`CartService::clear`] managed to do in storage.
#[must_use]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ClearOutcome {
    /// Memory and storage are both empty.
    Cleared,

    /// Memory is empty but the stored cart could not be deleted.
    StorageDiverged,
}

/// A user's cart held in memory and written through to a [`CartStore`].
pub struct CartService {
    store: Arc<dyn CartStore>,
    catalog: Arc<dyn Catalog>,
    user: Option<UserId>,
    cart: CartSnapshot,
}

impl Debug for CartService {
    fn fmt(&self, f: &mut Formatter<'_>) -> FmtResult {
        f.debug_struct("CartService")
            .field("user", &self.user)
            .field("cart", &self.cart)
            .finish_non_exhaustive()
    }
}

impl CartService {
    /// Creates a service with no user attached.
    #[must_use]
    pub fn new(store: Arc<dyn CartStore>, catalog: Arc<dyn Catalog>) -> Self {
        Self {
            store,
            catalog,
            user: None,
            cart: CartSnapshot::empty(),
        }
    }

    /// Replace the in-memory cart with the user's persisted cart.
    ///
    /// # Errors
    ///
    /// Returns [`CartError::StorageUnavailable`] when the cart cannot be loaded,
    /// in which case the service is left detached.
    #[instrument(skip(self))]
    pub async fn attach_user(&mut self, user: UserId) -> Result<(), CartError> {
        self.detach();

        let cart = self.store.load_active_cart(user).await?;

        debug!(lines = cart.lines.len(), "loaded active cart");

        self.user = Some(user);
        self.cart = cart;

        Ok(())
    }

    /// Drop the user and the in-memory cart. Storage is not touched.
    pub fn detach(&mut self) {
        self.user = None;
        self.cart = CartSnapshot::empty();
    }

    /// The attached user, if any.
    #[must_use]
    pub fn user(&self) -> Option<UserId> {
        self.user
    }

    /// The stored cart, once one has been created.
    #[must_use]
    pub fn cart_id(&self) -> Option<CartId> {
        self.cart.cart
    }

    /// Add one unit of `product`, merging with an existing line.
    ///
    /// # Errors
    ///
    /// Returns [`CartError::NoUserLoggedIn`] without a user,
    /// [`CartError::InvalidQuantity`] when the line or cart total would no
    /// longer fit in `u64`, or [`CartError::StorageUnavailable`] when a write
    /// fails. Memory is unchanged on error.
    #[instrument(skip(self, product), fields(product = %product.id))]
    pub async fn add_item(&mut self, product: &Product) -> Result<(), CartError> {
        let user = self.require_user()?;

        let quantity = match self.cart.line(product.id) {
            Some(line) => line
                .quantity
                .checked_add(1)
                .ok_or(CartError::InvalidQuantity(i64::from(line.quantity) + 1))?,
            None => 1,
        };

        if self.cart.total_with(product, quantity).is_none() {
            return Err(CartError::InvalidQuantity(i64::from(quantity)));
        }

        let cart = self.ensure_cart(user).await?;

        self.store.upsert_line(cart, product.id, quantity).await?;

        match self.cart.line_mut(product.id) {
            Some(line) => line.quantity = quantity,
            None => self.cart.lines.push(CartLine {
                product: product.clone(),
                quantity,
            }),
        }

        debug!(quantity, "cart line stored");

        Ok(())
    }

    /// Look `product` up in the catalog and add one unit of it.
    ///
    /// # Errors
    ///
    /// Returns [`CartError::ProductNotFound`] for an unknown id,
    /// [`CartError::CatalogUnavailable`] when the lookup fails, or any error of
    /// [`CartService::add_item`].
    pub async fn add_item_by_id(&mut self, product: ProductId) -> Result<(), CartError> {
        self.require_user()?;

        let found = self
            .catalog
            .find_by_id(product)
            .await?
            .ok_or(CartError::ProductNotFound(product))?;

        self.add_item(&found).await
    }

    /// Set the quantity of an existing line.
    ///
    /// # Errors
    ///
    /// Returns [`CartError::InvalidQuantity`] for `quantity <= 0` or when the
    /// cart total would overflow,
    /// [`CartError::ProductNotFound`] when the cart has no such line, or
    /// [`CartError::StorageUnavailable`] when the write fails. Memory is
    /// unchanged on error.
    #[instrument(skip(self))]
    pub async fn update_quantity(
        &mut self,
        product: ProductId,
        quantity: i64,
    ) -> Result<(), CartError> {
        self.require_user()?;

        let quantity = u32::try_from(quantity)
            .ok()
            .filter(|quantity| *quantity > 0)
            .ok_or(CartError::InvalidQuantity(quantity))?;

        let (Some(cart), Some(line)) = (self.cart.cart, self.cart.line(product)) else {
            return Err(CartError::ProductNotFound(product));
        };

        if self.cart.total_with(&line.product, quantity).is_none() {
            return Err(CartError::InvalidQuantity(i64::from(quantity)));
        }

        self.store.upsert_line(cart, product, quantity).await?;

        if let Some(line) = self.cart.line_mut(product) {
            line.quantity = quantity;
        }

        Ok(())
    }

    /// Remove a line. Removing a product that is not in the cart does nothing.
    ///
    /// # Errors
    ///
    /// Returns [`CartError::StorageUnavailable`] when the delete fails, leaving
    /// the line in memory.
    #[instrument(skip(self))]
    pub async fn remove_item(&mut self, product: ProductId) -> Result<(), CartError> {
        self.require_user()?;

        let (Some(cart), Some(_)) = (self.cart.cart, self.cart.line(product)) else {
            return Ok(());
        };

        self.store.delete_line(cart, product).await?;

        self.cart.remove_line(product);

        Ok(())
    }

    /// Empty the cart and delete it from storage.
    ///
    /// Memory is always empty afterwards. When the stored cart cannot be
    /// deleted the divergence is logged and reported as
    /// [`ClearOutcome::StorageDiverged`]; the next [`CartService::attach_user`]
    /// will load the leftover rows again.
    ///
    /// # Errors
    ///
    /// Returns [`CartError::NoUserLoggedIn`] without a user.
    #[instrument(skip(self))]
    pub async fn clear(&mut self) -> Result<ClearOutcome, CartError> {
        let user = self.require_user()?;

        let cart = self.cart.cart;

        self.forget_cart();

        let Some(cart) = cart else {
            return Ok(ClearOutcome::Cleared);
        };

        match self.store.delete_cart(cart).await {
            Ok(()) => Ok(ClearOutcome::Cleared),
            Err(error) => {
                warn!(
                    %user,
                    %cart,
                    %error,
                    "cart cleared in memory but not in storage"
                );

                Ok(ClearOutcome::StorageDiverged)
            }
        }
    }

    /// Sum of `quantity * price` over all lines, in minor units.
    ///
    /// `None` only for a cart loaded from storage whose total overflows `u64`;
    /// mutations that would overflow are rejected.
    #[must_use]
    pub fn total(&self) -> Option<u64> {
        self.cart.total()
    }

    /// Lines in insertion order.
    #[must_use]
    pub fn lines(&self) -> &[CartLine] {
        &self.cart.lines
    }

    /// Whether the cart has no lines.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.cart.is_empty()
    }

    /// Total number of units across all lines.
    #[must_use]
    pub fn item_count(&self) -> u64 {
        self.cart
            .lines
            .iter()
            .map(|line| u64::from(line.quantity))
            .sum()
    }

    /// Owned copy of the current cart.
    #[must_use]
    pub fn snapshot(&self) -> CartSnapshot {
        self.cart.clone()
    }

    /// Empty the in-memory cart without touching storage.
    pub(crate) fn forget_cart(&mut self) {
        self.cart = CartSnapshot::empty();
    }

    fn require_user(&self) -> Result<UserId, CartError> {
        self.user.ok_or(CartError::NoUserLoggedIn)
    }

    async fn ensure_cart(&mut self, user: UserId) -> Result<CartId, CartError> {
        if let Some(cart) = self.cart.cart {
            return Ok(cart);
        }

        let cart = self.store.create_cart(user).await?;

        debug!(%cart, "created cart");

        self.cart.cart = Some(cart);

        Ok(cart)
    }
}
