//! User row model.

use sqlx::FromRow;
use userdir_core::types::{DbId, Timestamp};
use userdir_core::user::StoredUser;

/// Full user row from the `users` table.
///
/// Contains the password hash -- NEVER serialize this to API responses.
#[derive(Debug, Clone, FromRow)]
pub struct User {
    pub id: DbId,
    pub name: String,
    pub phone: String,
    pub password_hash: String,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}

impl From<User> for StoredUser {
    fn from(row: User) -> Self {
        Self {
            id: row.id,
            name: row.name,
            phone: row.phone,
            password_hash: row.password_hash,
        }
    }
}
