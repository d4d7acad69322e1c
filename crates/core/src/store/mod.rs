//! Credential Store capability.
//!
//! - [`CredentialStore`] -- the trait the Identity Service depends on.
//! - [`memory::InMemoryCredentialStore`] -- process-local implementation
//!   enforcing the same unique indexes as the PostgreSQL schema.

pub mod memory;

use async_trait::async_trait;

use crate::error::StoreError;
use crate::types::DbId;
use crate::user::{NewUser, SessionToken, StoredUser};

/// Unique index on `users.phone`.
pub const UQ_USERS_PHONE: &str = "uq_users_phone";
/// Unique index on `user_tokens.user_id`.
pub const UQ_USER_TOKENS_USER_ID: &str = "uq_user_tokens_user_id";

/// Persistence for user records and the per-user login-token ledger.
///
/// Absence is reported as `Ok(None)`, never as an error. Every method is a
/// single-row, single-statement operation.
#[async_trait]
pub trait CredentialStore: Send + Sync {
    async fn find_by_id(&self, id: DbId) -> Result<Option<StoredUser>, StoreError>;

    async fn find_by_phone(&self, phone: &str) -> Result<Option<StoredUser>, StoreError>;

    /// Insert a user and return the store-assigned id.
    ///
    /// A duplicate phone fails with [`StoreError::UniqueViolation`] naming
    /// [`UQ_USERS_PHONE`].
    async fn insert(&self, user: &NewUser) -> Result<DbId, StoreError>;

    /// Overwrite name and phone of an existing user.
    async fn update_profile(&self, id: DbId, name: &str, phone: &str) -> Result<(), StoreError>;

    async fn find_token_by_user_id(
        &self,
        user_id: DbId,
    ) -> Result<Option<SessionToken>, StoreError>;

    /// Create the ledger row with `login_count = 1`.
    ///
    /// If a row for `user_id` was created concurrently, the token is replaced
    /// and the counter incremented instead, exactly as [`update_token`]
    /// would.
    ///
    /// [`update_token`]: CredentialStore::update_token
    async fn insert_token(&self, user_id: DbId, token: &str) -> Result<(), StoreError>;

    /// Replace the token and increment `login_count` by exactly one.
    async fn update_token(&self, token_id: DbId, token: &str) -> Result<(), StoreError>;

    /// Liveness probe for health checks.
    async fn ping(&self) -> Result<(), StoreError> {
        Ok(())
    }
}
