//! User and session-ledger domain types.

use serde::{Deserialize, Serialize};

use crate::types::DbId;

/// Full user record as held by the credential store.
///
/// Carries the password hash, so it must never be serialized to a client.
/// Use [`PublicUser`] for anything that leaves the service.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StoredUser {
    pub id: DbId,
    pub name: String,
    pub phone: String,
    pub password_hash: String,
}

/// Public view of a user: `{id, name, phone}`.
///
/// Also the identity snapshot embedded in session tokens.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PublicUser {
    pub id: DbId,
    pub name: String,
    pub phone: String,
}

impl From<&StoredUser> for PublicUser {
    fn from(user: &StoredUser) -> Self {
        Self {
            id: user.id,
            name: user.name.clone(),
            phone: user.phone.clone(),
        }
    }
}

impl From<StoredUser> for PublicUser {
    fn from(user: StoredUser) -> Self {
        Self {
            id: user.id,
            name: user.name,
            phone: user.phone,
        }
    }
}

/// Input for inserting a user. The password is already hashed.
#[derive(Debug, Clone)]
pub struct NewUser {
    pub name: String,
    pub phone: String,
    pub password_hash: String,
}

/// Ledger row tracking the latest token and the login count for one user.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SessionToken {
    pub id: DbId,
    pub user_id: DbId,
    pub token: String,
    pub login_count: i32,
}

/// Registration input, validated by the transport before it gets here.
#[derive(Debug, Clone)]
pub struct Registration {
    pub name: String,
    pub phone: String,
    pub password: String,
}

/// Login input.
#[derive(Debug, Clone)]
pub struct Credentials {
    pub phone: String,
    pub password: String,
}

/// New name and phone for an existing user.
#[derive(Debug, Clone)]
pub struct ProfileUpdate {
    pub name: String,
    pub phone: String,
}

/// Result of a successful login.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LoginOutcome {
    pub user_id: DbId,
    pub token: String,
}
