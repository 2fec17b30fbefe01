//! Test support.

mod memory;

pub(crate) use context::TestContext;
pub(crate) use memory::{Fault, MemoryStore};
