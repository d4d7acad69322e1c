//! Repository layer.
//!
//! Each repository is a zero-sized struct providing async methods
//! that accept `&PgPool` as the first argument.

pub mod user_repo;
pub mod user_token_repo;

pub use user_repo::UserRepo;
pub use user_token_repo::UserTokenRepo;
