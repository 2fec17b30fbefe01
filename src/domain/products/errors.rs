//! Catalog errors.

use thiserror::Error;

use crate::errors::{ErrorKind, StorageError};

/// Why the catalog could not be read.
#[derive(Debug, Error)]
pub enum CatalogError {
    /// The product store failed.
    #[error("catalog unavailable")]
    Unavailable(#[from] StorageError),
}

impl CatalogError {
    /// The user-visible kind of this error.
    #[must_use]
    pub const fn kind(&self) -> ErrorKind {
        match self {
            Self::Unavailable(_) => ErrorKind::CatalogUnavailable,
        }
    }
}

impl From<sqlx::Error> for CatalogError {
    fn from(error: sqlx::Error) -> Self {
        Self::Unavailable(error.into())
    }
}
