//! Storefront cart and order consistency.
//!
//! A user's cart lives in memory in a [`domain::carts::CartService`] and is
//! written through to storage on every change. Checkout turns that cart into an
//! order, its lines and a payment in one transaction.

pub mod context;
pub mod database;
pub mod domain;
pub mod errors;
pub mod money;
pub mod sessions;

#[cfg(test)]
mod test;

mod ids;
