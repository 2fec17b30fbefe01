//! Product Models

use serde::Serialize;

use crate::ids::TypedId;

/// Product Id
pub type ProductId = TypedId<Product>;

/// Product Model
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Product {
    /// Catalog id.
    pub id: ProductId,
    /// Display name.
    pub name: String,
    /// Unit price in minor units.
    pub price: u64,
    /// Free-text description.
    pub description: String,
}
