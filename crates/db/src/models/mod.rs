//! Row models.
//!
//! Each submodule contains a `FromRow` struct matching the database row and
//! a conversion into the corresponding `userdir_core` domain type.

pub mod user;
pub mod user_token;
