//! Error taxonomy shared by the Identity Service and its collaborators.
//!
//! [`CoreError`] is what callers of the service see. The narrower
//! [`StoreError`], [`HashError`], and [`TokenError`] are returned by the
//! capability traits and translated by the service.

use crate::types::DbId;

/// Domain-level error returned by every Identity Service operation.
#[derive(Debug, thiserror::Error)]
pub enum CoreError {
    #[error("Entity not found: {entity} with id {id}")]
    NotFound { entity: &'static str, id: DbId },

    #[error("Conflict: {0}")]
    Conflict(String),

    /// Identical for an unknown phone and a wrong password.
    #[error("invalid phone or password")]
    InvalidCredentials,

    /// Missing, malformed, tampered, or expired bearer token.
    #[error("unauthorized")]
    InvalidToken,

    #[error("Request was canceled")]
    Canceled,

    #[error("Request deadline exceeded")]
    DeadlineExceeded,

    #[error("Internal error: {0}")]
    Internal(String),
}

/// Failure reported by a [`CredentialStore`](crate::store::CredentialStore).
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum StoreError {
    /// A unique index rejected the write.
    #[error("unique constraint violated: {constraint}")]
    UniqueViolation { constraint: String },

    /// An update addressed a row that does not exist.
    #[error("no row in {table} with id {id}")]
    RowMissing { table: &'static str, id: DbId },

    /// Connectivity or any other driver-level fault.
    #[error("store backend error: {0}")]
    Backend(String),
}

/// Failure reported by a [`PasswordHasher`](crate::hasher::PasswordHasher).
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum HashError {
    /// The stored hash could not be parsed.
    #[error("malformed password hash: {0}")]
    Malformed(String),

    #[error("password hashing failed: {0}")]
    Backend(String),
}

/// Failure reported by a [`TokenIssuer`](crate::tokens::TokenIssuer).
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum TokenError {
    /// Signature, structure, or expiry check failed.
    #[error("invalid token")]
    Invalid,

    #[error("token signing failed: {0}")]
    Signing(String),
}
