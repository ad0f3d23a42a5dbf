//! # Password Hashing
//!
//! Argon2id with default parameters and a fresh random salt per password.
//! Hashes are stored as PHC strings (`$argon2id$v=19$...`), which carry the
//! algorithm, parameters, and salt needed for verification.

use argon2::password_hash::{PasswordHasher, SaltString};
use argon2::Argon2;
use rand_core::OsRng;
use thiserror::Error;

/// Failure to hash a password.
#[derive(Error, Debug)]
pub enum PasswordError {
    /// Hashing the plaintext failed.
    #[error("failed to hash password: {0}")]
    Hash(String),
}

/// Hash `password` with Argon2id and a random salt.
pub fn hash_password(password: &str) -> Result<String, PasswordError> {
    let salt = SaltString::generate(&mut OsRng);
    Argon2::default()
        .hash_password(password.as_bytes(), &salt)
        .map(|hash| hash.to_string())
        .map_err(|e| PasswordError::Hash(e.to_string()))
}
