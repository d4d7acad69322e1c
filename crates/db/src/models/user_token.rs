//! Login ledger row model.

use sqlx::FromRow;
use userdir_core::types::{DbId, Timestamp};
use userdir_core::user::SessionToken;

/// A row from the `user_tokens` table.
#[derive(Debug, Clone, FromRow)]
pub struct UserToken {
    pub id: DbId,
    pub user_id: DbId,
    pub token: String,
    pub login_count: i32,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}

impl From<UserToken> for SessionToken {
    fn from(row: UserToken) -> Self {
        Self {
            id: row.id,
            user_id: row.user_id,
            token: row.token,
            login_count: row.login_count,
        }
    }
}
