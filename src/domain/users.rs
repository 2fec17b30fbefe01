//! Users
//!
//! Identity is supplied by an external provider; the engine only needs a stable id.

use crate::ids::TypedId;

/// Marker for user identifiers.
#[derive(Debug)]
pub struct UserRecord;

/// User Id
pub type UserId = TypedId<UserRecord>;
