//! Cart Models

use serde::Serialize;

use crate::{
    domain::products::models::{Product, ProductId},
    ids::TypedId,
};

/// Marker for cart identifiers.
#[derive(Debug)]
pub struct CartRecord;

/// Cart Id
pub type CartId = TypedId<CartRecord>;

/// One product and how many of it the cart holds. `quantity` is never zero.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CartLine {
    /// The product as it was when the line was loaded or added.
    pub product: Product,
    /// Units of the product, at least 1.
    pub quantity: u32,
}

impl CartLine {
    /// `quantity * price`, in minor units, or `None` if it does not fit.
    #[must_use]
    pub fn line_total(&self) -> Option<u64> {
        self.product.price.checked_mul(u64::from(self.quantity))
    }
}

/// Cart contents as persisted for a user.
///
/// `cart` is `None` until the store has allocated a cart row. Lines keep
/// insertion order and never repeat a product.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct CartSnapshot {
    /// The stored cart row, if one exists.
    pub cart: Option<CartId>,
    /// Lines in insertion order.
    pub lines: Vec<CartLine>,
}

impl CartSnapshot {
    /// A snapshot with no cart row and no lines.
    #[must_use]
    pub fn empty() -> Self {
        Self::default()
    }

    /// Sum of line totals, in minor units, or `None` on overflow.
    #[must_use]
    pub fn total(&self) -> Option<u64> {
        self.lines
            .iter()
            .try_fold(0_u64, |total, line| total.checked_add(line.line_total()?))
    }

    /// The total after setting `product`'s quantity to `quantity`, adding the
    /// line if it is missing. `None` on overflow.
    #[must_use]
    pub fn total_with(&self, product: &Product, quantity: u32) -> Option<u64> {
        let replaced = CartLine {
            product: product.clone(),
            quantity,
        };

        let others = self
            .lines
            .iter()
            .filter(|line| line.product.id != product.id)
            .try_fold(0_u64, |total, line| total.checked_add(line.line_total()?))?;

        others.checked_add(replaced.line_total()?)
    }

    /// Whether the cart has no lines.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.lines.is_empty()
    }

    /// The line for `product`, if the cart holds it.
    #[must_use]
    pub fn line(&self, product: ProductId) -> Option<&CartLine> {
        self.lines.iter().find(|line| line.product.id == product)
    }

    pub(crate) fn line_mut(&mut self, product: ProductId) -> Option<&mut CartLine> {
        self.lines.iter_mut().find(|line| line.product.id == product)
    }

    pub(crate) fn remove_line(&mut self, product: ProductId) {
        self.lines.retain(|line| line.product.id != product);
    }
}
