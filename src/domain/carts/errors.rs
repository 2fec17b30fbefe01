//! Cart errors.

use thiserror::Error;

use crate::{
    domain::products::{errors::CatalogError, models::ProductId},
    errors::{ErrorKind, StorageError},
};

/// Why a cart operation was refused.
#[derive(Debug, Error)]
pub enum CartError {
    /// The cart has no user attached.
    #[error("no user logged in")]
    NoUserLoggedIn,

    /// Below 1, or large enough that the cart total would overflow.
    #[error("invalid quantity {0}")]
    InvalidQuantity(i64),

    /// The catalog has no product with this id.
    #[error("product {0} not found")]
    ProductNotFound(ProductId),

    /// The cart store failed; memory was left unchanged.
    #[error("cart storage unavailable")]
    StorageUnavailable(#[from] StorageError),

    /// The catalog could not be read.
    #[error(transparent)]
    CatalogUnavailable(#[from] CatalogError),
}

impl CartError {
    /// The user-visible kind of this error.
    #[must_use]
    pub const fn kind(&self) -> ErrorKind {
        match self {
            Self::NoUserLoggedIn => ErrorKind::NoUserLoggedIn,
            Self::InvalidQuantity(_) => ErrorKind::InvalidQuantity,
            Self::ProductNotFound(_) => ErrorKind::ProductNotFound,
            Self::StorageUnavailable(_) => ErrorKind::StorageUnavailable,
            Self::CatalogUnavailable(_) => ErrorKind::CatalogUnavailable,
        }
    }
}
