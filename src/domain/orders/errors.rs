//! Checkout errors.

use std::time::Duration;

use thiserror::Error;

use crate::errors::{ErrorKind, StorageError};

/// Why a checkout did not produce an order.
#[derive(Debug, Error)]
pub enum CheckoutError {
    /// The cart has no user attached.
    #[error("no user logged in")]
    NoUserLoggedIn,

    /// The cart has no lines.
    #[error("cart is empty")]
    EmptyCart,

    /// The cart total does not fit in `u64`.
    #[error("cart total is too large to check out")]
    TotalOverflow,

    /// Another checkout for the same user has not finished.
    #[error("a checkout is already in progress for this user")]
    CheckoutInProgress,

    /// The checkout transaction could not be opened.
    #[error("order storage unavailable")]
    StorageUnavailable(#[source] StorageError),

    /// Writing the order header failed.
    #[error("failed to create order")]
    OrderCreationFailed(#[source] StorageError),

    /// Writing the order lines failed.
    #[error("failed to store order lines")]
    OrderLinesFailed(#[source] StorageError),

    /// Writing the payment failed.
    #[error("failed to record payment")]
    PaymentFailed(#[source] StorageError),

    /// Removing the stored cart failed.
    #[error("failed to remove the checked out cart")]
    CartCleanupFailed(#[source] StorageError),

    /// The store rejected the commit.
    #[error("failed to commit checkout")]
    CommitFailed(#[source] StorageError),

    /// Begin, the writes and the commit did not finish within the bound.
    #[error("checkout timed out after {0:?}")]
    TimedOut(Duration),
}

impl CheckoutError {
    /// The user-visible kind of this error.
    #[must_use]
    pub const fn kind(&self) -> ErrorKind {
        match self {
            Self::NoUserLoggedIn => ErrorKind::NoUserLoggedIn,
            Self::EmptyCart => ErrorKind::EmptyCart,
            Self::TotalOverflow => ErrorKind::InvalidQuantity,
            Self::CheckoutInProgress => ErrorKind::CheckoutInProgress,
            Self::OrderCreationFailed(_) => ErrorKind::OrderCreationFailed,
            Self::OrderLinesFailed(_) => ErrorKind::OrderLinesFailed,
            Self::PaymentFailed(_) => ErrorKind::PaymentFailed,
            Self::TimedOut(_) => ErrorKind::CheckoutTimedOut,
            Self::StorageUnavailable(_) | Self::CartCleanupFailed(_) | Self::CommitFailed(_) => {
                ErrorKind::StorageUnavailable
            }
        }
    }
}
