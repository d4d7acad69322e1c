//! In-memory [`CredentialStore`] guarded by a single async `RwLock`.
//!
//! Ids are auto-incremented from 1, mirroring BIGSERIAL. The unique indexes
//! on phone and ledger `user_id` are enforced the same way PostgreSQL does.

use async_trait::async_trait;
use tokio::sync::RwLock;

use super::{CredentialStore, UQ_USERS_PHONE};
use crate::error::StoreError;
use crate::types::DbId;
use crate::user::{NewUser, SessionToken, StoredUser};

#[derive(Debug, Default)]
struct Tables {
    users: Vec<StoredUser>,
    tokens: Vec<SessionToken>,
    next_user_id: DbId,
    next_token_id: DbId,
}

impl Tables {
    fn allocate_user_id(&mut self) -> DbId {
        self.next_user_id += 1;
        self.next_user_id
    }

    fn allocate_token_id(&mut self) -> DbId {
        self.next_token_id += 1;
        self.next_token_id
    }
}

#[derive(Debug, Default)]
pub struct InMemoryCredentialStore {
    tables: RwLock<Tables>,
}

impl InMemoryCredentialStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of user rows currently stored.
    pub async fn user_count(&self) -> usize {
        self.tables.read().await.users.len()
    }
}

#[async_trait]
impl CredentialStore for InMemoryCredentialStore {
    async fn find_by_id(&self, id: DbId) -> Result<Option<StoredUser>, StoreError> {
        let tables = self.tables.read().await;
        Ok(tables.users.iter().find(|u| u.id == id).cloned())
    }

    async fn find_by_phone(&self, phone: &str) -> Result<Option<StoredUser>, StoreError> {
        let tables = self.tables.read().await;
        Ok(tables.users.iter().find(|u| u.phone == phone).cloned())
    }

    async fn insert(&self, user: &NewUser) -> Result<DbId, StoreError> {
        let mut tables = self.tables.write().await;
        if tables.users.iter().any(|u| u.phone == user.phone) {
            return Err(StoreError::UniqueViolation {
                constraint: UQ_USERS_PHONE.to_string(),
            });
        }
        let id = tables.allocate_user_id();
        tables.users.push(StoredUser {
            id,
            name: user.name.clone(),
            phone: user.phone.clone(),
            password_hash: user.password_hash.clone(),
        });
        Ok(id)
    }

    async fn update_profile(&self, id: DbId, name: &str, phone: &str) -> Result<(), StoreError> {
        let mut tables = self.tables.write().await;
        if tables.users.iter().any(|u| u.phone == phone && u.id != id) {
            return Err(StoreError::UniqueViolation {
                constraint: UQ_USERS_PHONE.to_string(),
            });
        }
        let user = tables
            .users
            .iter_mut()
            .find(|u| u.id == id)
            .ok_or(StoreError::RowMissing { table: "users", id })?;
        user.name = name.to_string();
        user.phone = phone.to_string();
        Ok(())
    }

    async fn find_token_by_user_id(
        &self,
        user_id: DbId,
    ) -> Result<Option<SessionToken>, StoreError> {
        let tables = self.tables.read().await;
        Ok(tables.tokens.iter().find(|t| t.user_id == user_id).cloned())
    }

    async fn insert_token(&self, user_id: DbId, token: &str) -> Result<(), StoreError> {
        let mut tables = self.tables.write().await;
        if !tables.users.iter().any(|u| u.id == user_id) {
            return Err(StoreError::Backend(format!(
                "foreign key violation: no user with id {user_id}"
            )));
        }
        if let Some(existing) = tables.tokens.iter_mut().find(|t| t.user_id == user_id) {
            existing.token = token.to_string();
            existing.login_count += 1;
            return Ok(());
        }
        let id = tables.allocate_token_id();
        tables.tokens.push(SessionToken {
            id,
            user_id,
            token: token.to_string(),
            login_count: 1,
        });
        Ok(())
    }

    async fn update_token(&self, token_id: DbId, token: &str) -> Result<(), StoreError> {
        let mut tables = self.tables.write().await;
        let row = tables
            .tokens
            .iter_mut()
            .find(|t| t.id == token_id)
            .ok_or(StoreError::RowMissing {
                table: "user_tokens",
                id: token_id,
            })?;
        row.token = token.to_string();
        row.login_count += 1;
        Ok(())
    }
}
