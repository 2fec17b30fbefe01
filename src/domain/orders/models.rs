//! Order Models

use jiff::Timestamp;
use serde::Serialize;

use crate::{
    domain::{products::models::ProductId, users::UserId},
    ids::TypedId,
};

/// Order Id
pub type OrderId = TypedId<Order>;

/// Payment Id
pub type PaymentId = TypedId<Payment>;

/// A product and quantity copied from the cart at commit time.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct OrderLine {
    /// The product ordered.
    pub product: ProductId,
    /// Units ordered, at least 1.
    pub quantity: u32,
}

/// Order Model
///
/// `amount` is the cart total captured at checkout, not a sum over `lines`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Order {
    /// Store-assigned id.
    pub id: OrderId,
    /// Who placed the order.
    pub user: UserId,
    /// Total in minor units.
    pub amount: u64,
    /// Lines in cart order.
    pub lines: Vec<OrderLine>,
    /// When the order row was written.
    pub created_at: Timestamp,
}

/// Payment Model
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Payment {
    /// Store-assigned id.
    pub id: PaymentId,
    /// The order this pays for.
    pub order: OrderId,
    /// Who paid.
    pub user: UserId,
    /// Amount charged in minor units.
    pub amount: u64,
    /// When the payment row was written.
    pub created_at: Timestamp,
}

/// What a committed checkout produced.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Receipt {
    /// The new order.
    pub order: OrderId,
    /// Its payment.
    pub payment: PaymentId,
    /// Amount charged in minor units.
    pub amount: u64,
    /// Lines as ordered.
    pub lines: Vec<OrderLine>,
}
