//! Storage errors and user-facing error kinds.

use sqlx::{
    Error,
    error::{DatabaseError, ErrorKind as SqlErrorKind},
};
use thiserror::Error;

/// Failure reported by a persistence backend.
#[derive(Debug, Error)]
pub enum StorageError {
    /// A unique constraint was violated.
    #[error("record already exists")]
    AlreadyExists,

    /// The requested row does not exist.
    #[error("record not found")]
    NotFound,

    /// A foreign key points at a missing row.
    #[error("related record not found")]
    InvalidReference,

    /// A not-null or check constraint was violated.
    #[error("invalid data")]
    InvalidData,

    /// The backend could not be reached.
    #[error("storage unavailable: {0}")]
    Unavailable(String),

    /// Any other database failure.
    #[error("storage error")]
    Sql(#[source] Error),
}

impl From<Error> for StorageError {
    fn from(error: Error) -> Self {
        if matches!(error, Error::RowNotFound) {
            return Self::NotFound;
        }

        match error.as_database_error().map(DatabaseError::kind) {
            Some(SqlErrorKind::UniqueViolation) => Self::AlreadyExists,
            Some(SqlErrorKind::ForeignKeyViolation) => Self::InvalidReference,
            Some(SqlErrorKind::NotNullViolation | SqlErrorKind::CheckViolation) => {
                Self::InvalidData
            }
            Some(SqlErrorKind::Other | _) | None => Self::Sql(error),
        }
    }
}

/// The user-visible error kinds surfaced at the presentation boundary.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorKind {
    /// No user is attached to the cart.
    NoUserLoggedIn,
    /// Checkout of a cart with no lines.
    EmptyCart,
    /// A quantity below 1 or one that overflows the cart total.
    InvalidQuantity,
    /// An unknown product id.
    ProductNotFound,
    /// Storage could not be reached or a write did not stick.
    StorageUnavailable,
    /// The order header could not be written.
    OrderCreationFailed,
    /// The order lines could not be written.
    OrderLinesFailed,
    /// The payment could not be written.
    PaymentFailed,
    /// The product catalog could not be read.
    CatalogUnavailable,
    /// The user already has a checkout running.
    CheckoutInProgress,
    /// Checkout exceeded its time bound.
    CheckoutTimedOut,
}

impl ErrorKind {
    /// Every kind, in declaration order.
    pub const ALL: [Self; 11] = [
        Self::NoUserLoggedIn,
        Self::EmptyCart,
        Self::InvalidQuantity,
        Self::ProductNotFound,
        Self::StorageUnavailable,
        Self::OrderCreationFailed,
        Self::OrderLinesFailed,
        Self::PaymentFailed,
        Self::CatalogUnavailable,
        Self::CheckoutInProgress,
        Self::CheckoutTimedOut,
    ];

    /// Human-readable message for display to a shopper.
    #[must_use]
    pub const fn message(self) -> &'static str {
        match self {
            Self::NoUserLoggedIn => "Please log in to use your cart.",
            Self::EmptyCart => "Your cart is empty.",
            Self::InvalidQuantity => "Please choose a quantity of at least 1 that keeps your cart total in range.",
            Self::ProductNotFound => "That product could not be found.",
            Self::StorageUnavailable => "We could not reach the store right now. Please try again.",
            Self::OrderCreationFailed => "Your order could not be created. You have not been charged.",
            Self::OrderLinesFailed => "Your order items could not be saved. You have not been charged.",
            Self::PaymentFailed => "Your payment could not be recorded. You have not been charged.",
            Self::CatalogUnavailable => "The product catalog is unavailable right now.",
            Self::CheckoutInProgress => "A checkout is already in progress for your account.",
            Self::CheckoutTimedOut => "Checkout took too long and was cancelled. You have not been charged.",
        }
    }
}
