//! Token Issuer capability.

use crate::error::TokenError;
use crate::user::PublicUser;

/// Subject claim carried by every session token.
pub const TOKEN_SUBJECT: &str = "Auth";

/// Mints and verifies signed session tokens embedding a user snapshot.
pub trait TokenIssuer: Send + Sync {
    /// Sign a new token for `user`. Each call yields a distinct token.
    fn issue(&self, user: &PublicUser) -> Result<String, TokenError>;

    /// Verify signature and expiry and return the embedded snapshot.
    fn parse(&self, token: &str) -> Result<PublicUser, TokenError>;
}
