//! Argon2id password hashing and verification.
//!
//! All password hashes use the Argon2id variant with a cryptographically random
//! salt generated via [`OsRng`]. The PHC string format is used for storage so
//! that algorithm parameters and salt are embedded in the hash itself; a hash
//! produced under older cost parameters still verifies after they change.

use argon2::password_hash::rand_core::OsRng;
use argon2::password_hash::{PasswordHash, PasswordHasher as _, PasswordVerifier, SaltString};
use argon2::{Algorithm, Argon2, Params, Version};
use userdir_core::error::HashError;
use userdir_core::hasher::PasswordHasher;

use crate::config::{env_or, ConfigError};

/// Argon2 cost parameters.
#[derive(Debug, Clone)]
pub struct HashConfig {
    /// Memory cost in KiB.
    pub memory_kib: u32,
    /// Number of passes.
    pub iterations: u32,
    /// Degree of parallelism.
    pub parallelism: u32,
}

impl Default for HashConfig {
    /// The `argon2` crate's recommended defaults.
    fn default() -> Self {
        Self {
            memory_kib: Params::DEFAULT_M_COST,
            iterations: Params::DEFAULT_T_COST,
            parallelism: Params::DEFAULT_P_COST,
        }
    }
}

impl HashConfig {
    /// Load hashing cost from environment variables.
    ///
    /// | Env Var            | Default  |
    /// |--------------------|----------|
    /// | `HASH_MEMORY_KIB`  | `19456`  |
    /// | `HASH_ITERATIONS`  | `2`      |
    /// | `HASH_PARALLELISM` | `1`      |
    pub fn from_env() -> Result<Self, ConfigError> {
        let defaults = Self::default();
        Ok(Self {
            memory_kib: env_or("HASH_MEMORY_KIB", defaults.memory_kib)?,
            iterations: env_or("HASH_ITERATIONS", defaults.iterations)?,
            parallelism: env_or("HASH_PARALLELISM", defaults.parallelism)?,
        })
    }
}

/// Argon2id [`PasswordHasher`].
#[derive(Debug, Clone)]
pub struct Argon2Hasher {
    params: Params,
}

impl Argon2Hasher {
    /// Build a hasher, rejecting cost parameters Argon2 does not accept.
    pub fn new(config: &HashConfig) -> Result<Self, HashError> {
        let params = Params::new(
            config.memory_kib,
            config.iterations,
            config.parallelism,
            None,
        )
        .map_err(|e| HashError::Backend(format!("invalid Argon2 parameters: {e}")))?;
        Ok(Self { params })
    }

    fn argon2(&self) -> Argon2<'static> {
        Argon2::new(Algorithm::Argon2id, Version::V0x13, self.params.clone())
    }
}

impl PasswordHasher for Argon2Hasher {
    /// Returns the PHC-formatted hash string (includes algorithm, params, salt, and hash).
    fn hash(&self, plaintext: &str) -> Result<String, HashError> {
        let salt = SaltString::generate(&mut OsRng);
        self.argon2()
            .hash_password(plaintext.as_bytes(), &salt)
            .map(|hash| hash.to_string())
            .map_err(|e| HashError::Backend(e.to_string()))
    }

    /// Returns `Ok(true)` if the password matches, `Ok(false)` if it does not.
    fn verify(&self, plaintext: &str, hash: &str) -> Result<bool, HashError> {
        let parsed_hash = PasswordHash::new(hash).map_err(|e| HashError::Malformed(e.to_string()))?;
        match self.argon2().verify_password(plaintext.as_bytes(), &parsed_hash) {
            Ok(()) => Ok(true),
            Err(argon2::password_hash::Error::Password) => Ok(false),
            Err(e) => Err(HashError::Backend(e.to_string())),
        }
    }
}
