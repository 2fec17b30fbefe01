//! Carts

pub mod errors;
pub mod models;
pub(crate) mod repositories;
pub mod service;
pub mod store;

pub use errors::CartError;
pub use service::*;
pub use store::*;
