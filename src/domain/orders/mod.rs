//! Orders

pub mod checkout;
pub mod errors;
pub mod models;
mod repositories;
pub mod store;

pub use checkout::*;
pub use errors::CheckoutError;
pub use store::*;
