//! [`CredentialStore`] backed by PostgreSQL.

use async_trait::async_trait;
use userdir_core::error::StoreError;
use userdir_core::store::CredentialStore;
use userdir_core::types::DbId;
use userdir_core::user::{NewUser, SessionToken, StoredUser};

use crate::repositories::{UserRepo, UserTokenRepo};
use crate::DbPool;

/// PostgreSQL unique-constraint violation.
const UNIQUE_VIOLATION: &str = "23505";

/// Production credential store over a shared `sqlx` pool.
#[derive(Debug, Clone)]
pub struct PgCredentialStore {
    pool: DbPool,
}

impl PgCredentialStore {
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }
}

/// Classify a sqlx error into a [`StoreError`].
///
/// Unique violations keep their constraint name so the service can tell a
/// duplicate phone apart from other faults. Driver messages stay inside
/// [`StoreError::Backend`] and are only ever logged.
fn classify(err: sqlx::Error) -> StoreError {
    if let sqlx::Error::Database(db_err) = &err {
        if db_err.code().as_deref() == Some(UNIQUE_VIOLATION) {
            let constraint = db_err.constraint().unwrap_or("unknown");
            tracing::debug!(constraint, "Unique constraint rejected write");
            return StoreError::UniqueViolation {
                constraint: constraint.to_string(),
            };
        }
    }
    StoreError::Backend(err.to_string())
}

#[async_trait]
impl CredentialStore for PgCredentialStore {
    async fn find_by_id(&self, id: DbId) -> Result<Option<StoredUser>, StoreError> {
        let row = UserRepo::find_by_id(&self.pool, id).await.map_err(classify)?;
        Ok(row.map(StoredUser::from))
    }

    async fn find_by_phone(&self, phone: &str) -> Result<Option<StoredUser>, StoreError> {
        let row = UserRepo::find_by_phone(&self.pool, phone)
            .await
            .map_err(classify)?;
        Ok(row.map(StoredUser::from))
    }

    async fn insert(&self, user: &NewUser) -> Result<DbId, StoreError> {
        UserRepo::create(&self.pool, &user.name, &user.phone, &user.password_hash)
            .await
            .map_err(classify)
    }

    async fn update_profile(&self, id: DbId, name: &str, phone: &str) -> Result<(), StoreError> {
        let updated = UserRepo::update_profile(&self.pool, id, name, phone)
            .await
            .map_err(classify)?;
        if !updated {
            return Err(StoreError::RowMissing { table: "users", id });
        }
        Ok(())
    }

    async fn find_token_by_user_id(
        &self,
        user_id: DbId,
    ) -> Result<Option<SessionToken>, StoreError> {
        let row = UserTokenRepo::find_by_user_id(&self.pool, user_id)
            .await
            .map_err(classify)?;
        Ok(row.map(SessionToken::from))
    }

    async fn insert_token(&self, user_id: DbId, token: &str) -> Result<(), StoreError> {
        UserTokenRepo::create(&self.pool, user_id, token)
            .await
            .map_err(classify)
    }

    async fn update_token(&self, token_id: DbId, token: &str) -> Result<(), StoreError> {
        let updated = UserTokenRepo::rotate(&self.pool, token_id, token)
            .await
            .map_err(classify)?;
        if !updated {
            return Err(StoreError::RowMissing {
                table: "user_tokens",
                id: token_id,
            });
        }
        Ok(())
    }

    async fn ping(&self) -> Result<(), StoreError> {
        crate::health_check(&self.pool).await.map_err(classify)
    }
}
