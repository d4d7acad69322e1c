//! Password Hasher capability.

use crate::error::HashError;

/// One-way, self-salted password hashing with constant-time verification.
pub trait PasswordHasher: Send + Sync {
    /// Hash `plaintext` with a fresh random salt.
    fn hash(&self, plaintext: &str) -> Result<String, HashError>;

    /// Check `plaintext` against a stored hash.
    ///
    /// Returns `Ok(false)` on mismatch. Errors only when `hash` is malformed.
    fn verify(&self, plaintext: &str, hash: &str) -> Result<bool, HashError>;
}
