//! Repository for the `users` table.

use sqlx::PgPool;
use userdir_core::types::DbId;

use crate::models::user::User;

/// Column list shared across queries to avoid repetition.
const COLUMNS: &str = "id, name, phone, password_hash, created_at, updated_at";

/// Provides CRUD operations for users.
pub struct UserRepo;

impl UserRepo {
    /// Insert a new user, returning the generated id.
    pub async fn create(
        pool: &PgPool,
        name: &str,
        phone: &str,
        password_hash: &str,
    ) -> Result<DbId, sqlx::Error> {
        let (id,): (DbId,) = sqlx::query_as(
            "INSERT INTO users (name, phone, password_hash)
             VALUES ($1, $2, $3)
             RETURNING id",
        )
        .bind(name)
        .bind(phone)
        .bind(password_hash)
        .fetch_one(pool)
        .await?;
        Ok(id)
    }

    /// Find a user by internal ID.
    pub async fn find_by_id(pool: &PgPool, id: DbId) -> Result<Option<User>, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} FROM users WHERE id = $1");
        sqlx::query_as::<_, User>(&query)
            .bind(id)
            .fetch_optional(pool)
            .await
    }

    /// Find a user by phone number (exact match).
    pub async fn find_by_phone(pool: &PgPool, phone: &str) -> Result<Option<User>, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} FROM users WHERE phone = $1");
        sqlx::query_as::<_, User>(&query)
            .bind(phone)
            .fetch_optional(pool)
            .await
    }

    /// Overwrite name and phone.
    ///
    /// Returns `true` if the row was updated.
    pub async fn update_profile(
        pool: &PgPool,
        id: DbId,
        name: &str,
        phone: &str,
    ) -> Result<bool, sqlx::Error> {
        let result = sqlx::query(
            "UPDATE users SET
                name = $2,
                phone = $3,
                updated_at = NOW()
             WHERE id = $1",
        )
        .bind(id)
        .bind(name)
        .bind(phone)
        .execute(pool)
        .await?;
        Ok(result.rows_affected() > 0)
    }
}
