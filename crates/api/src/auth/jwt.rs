//! JWT session-token issuance and validation.
//!
//! Tokens are HS256-signed JWTs carrying a [`Claims`] payload: the standard
//! issuer / subject / id / issued-at / expiry claims plus a snapshot of the
//! user's id, name, and phone at login time.

use jsonwebtoken::{decode, encode, Algorithm, DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};
use userdir_core::error::TokenError;
use userdir_core::tokens::{TokenIssuer, TOKEN_SUBJECT};
use userdir_core::user::PublicUser;
use uuid::Uuid;

use crate::config::{env_or, required_env, ConfigError};

/// JWT claims embedded in every session token.
#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct Claims {
    /// Issuer -- the application name.
    pub iss: String,
    /// Subject -- always [`TOKEN_SUBJECT`].
    pub sub: String,
    /// Unique token identifier (UUID v4).
    pub jti: String,
    /// Issued-at time (UTC Unix timestamp).
    pub iat: i64,
    /// Expiration time (UTC Unix timestamp).
    pub exp: i64,
    /// Point-in-time copy of the user; not refreshed on profile change.
    pub user: PublicUser,
}

/// Configuration for JWT token generation and validation.
#[derive(Debug, Clone)]
pub struct JwtConfig {
    /// HMAC-SHA256 secret used to sign and verify tokens.
    pub secret: String,
    /// Value of the `iss` claim.
    pub issuer: String,
    /// Token lifetime in hours (default: 24).
    pub expiry_hours: i64,
}

/// Default token lifetime in hours.
const DEFAULT_EXPIRY_HOURS: i64 = 24;

impl JwtConfig {
    /// Load JWT configuration from environment variables.
    ///
    /// | Env Var            | Required | Default |
    /// |--------------------|----------|---------|
    /// | `JWT_SECRET`       | **yes**  | --      |
    /// | `JWT_EXPIRY_HOURS` | no       | `24`    |
    ///
    /// The issuer is the application name resolved by the caller.
    pub fn from_env(issuer: String) -> Result<Self, ConfigError> {
        let secret = required_env("JWT_SECRET")?;
        let expiry_hours = env_or("JWT_EXPIRY_HOURS", DEFAULT_EXPIRY_HOURS)?;

        Ok(Self {
            secret,
            issuer,
            expiry_hours,
        })
    }
}

/// HS256 [`TokenIssuer`].
pub struct JwtIssuer {
    config: JwtConfig,
    encoding_key: EncodingKey,
    decoding_key: DecodingKey,
    validation: Validation,
}

impl JwtIssuer {
    pub fn new(config: JwtConfig) -> Self {
        let mut validation = Validation::new(Algorithm::HS256);
        // Expired means expired: no grace period.
        validation.leeway = 0;

        Self {
            encoding_key: EncodingKey::from_secret(config.secret.as_bytes()),
            decoding_key: DecodingKey::from_secret(config.secret.as_bytes()),
            validation,
            config,
        }
    }

    /// Token lifetime in seconds.
    pub fn expires_in(&self) -> i64 {
        self.config.expiry_hours * 3600
    }

    /// Validate and decode a token, returning the full [`Claims`].
    pub fn decode_claims(&self, token: &str) -> Result<Claims, jsonwebtoken::errors::Error> {
        decode::<Claims>(token, &self.decoding_key, &self.validation).map(|data| data.claims)
    }
}

impl TokenIssuer for JwtIssuer {
    fn issue(&self, user: &PublicUser) -> Result<String, TokenError> {
        let now = chrono::Utc::now().timestamp();

        let claims = Claims {
            iss: self.config.issuer.clone(),
            sub: TOKEN_SUBJECT.to_string(),
            jti: Uuid::new_v4().to_string(),
            iat: now,
            exp: now + self.expires_in(),
            user: user.clone(),
        };

        encode(&Header::default(), &claims, &self.encoding_key)
            .map_err(|e| TokenError::Signing(e.to_string()))
    }

    fn parse(&self, token: &str) -> Result<PublicUser, TokenError> {
        self.decode_claims(token)
            .map(|claims| claims.user)
            .map_err(|_| TokenError::Invalid)
    }
}
