//! Repository for the `user_tokens` login ledger.

use sqlx::PgPool;
use userdir_core::types::DbId;

use crate::models::user_token::UserToken;

/// Column list shared across queries to avoid repetition.
const COLUMNS: &str = "id, user_id, token, login_count, created_at, updated_at";

/// Provides ledger operations for user tokens.
pub struct UserTokenRepo;

impl UserTokenRepo {
    /// Find the ledger row for a user.
    pub async fn find_by_user_id(
        pool: &PgPool,
        user_id: DbId,
    ) -> Result<Option<UserToken>, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} FROM user_tokens WHERE user_id = $1");
        sqlx::query_as::<_, UserToken>(&query)
            .bind(user_id)
            .fetch_optional(pool)
            .await
    }

    /// Create the ledger row with `login_count = 1`.
    ///
    /// If another login created the row first, the token is replaced and
    /// the counter incremented in the same statement.
    pub async fn create(pool: &PgPool, user_id: DbId, token: &str) -> Result<(), sqlx::Error> {
        sqlx::query(
            "INSERT INTO user_tokens (user_id, token, login_count)
             VALUES ($1, $2, 1)
             ON CONFLICT ON CONSTRAINT uq_user_tokens_user_id DO UPDATE SET
                token = EXCLUDED.token,
                login_count = user_tokens.login_count + 1,
                updated_at = NOW()",
        )
        .bind(user_id)
        .bind(token)
        .execute(pool)
        .await?;
        Ok(())
    }

    /// Replace the token and increment `login_count` by one.
    ///
    /// Returns `true` if the row was updated.
    pub async fn rotate(pool: &PgPool, id: DbId, token: &str) -> Result<bool, sqlx::Error> {
        let result = sqlx::query(
            "UPDATE user_tokens SET
                token = $2,
                login_count = login_count + 1,
                updated_at = NOW()
             WHERE id = $1",
        )
        .bind(id)
        .bind(token)
        .execute(pool)
        .await?;
        Ok(result.rows_affected() > 0)
    }
}
