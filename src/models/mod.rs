//! Domain models for doable.
//!
//! There is a single persisted entity, the [`Todo`]. Everything else here is
//! request/response shape: the create/update inputs, the list query with its
//! paging defaults, and the [`TodoPage`] envelope the list endpoint returns.
//!
//! All types serialize with camelCase field names to match the wire format.

mod todo;

pub use todo::*;
