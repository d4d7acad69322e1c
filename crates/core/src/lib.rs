//! Identity and session management core for the user directory.
//!
//! Holds the domain types, the error taxonomy, the capability traits
//! ([`store::CredentialStore`], [`hasher::PasswordHasher`],
//! [`tokens::TokenIssuer`]) and the [`identity::IdentityService`] that
//! orchestrates them. Transport and storage live in sibling crates.

pub mod context;
pub mod error;
pub mod hasher;
pub mod identity;
pub mod store;
pub mod tokens;
pub mod types;
pub mod user;
pub mod validation;
