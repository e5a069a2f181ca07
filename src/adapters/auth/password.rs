//! Argon2 password hashing.

use argon2::password_hash::{
    rand_core::OsRng, PasswordHash as EncodedHash, PasswordHasher as _, PasswordVerifier,
    SaltString,
};
use argon2::Argon2;

use crate::domain::foundation::{DomainError, ErrorCode};
use crate::domain::user::PasswordHash;
use crate::ports::PasswordHasher;

/// Argon2id with the crate's default parameters and a random salt per hash.
#[derive(Debug, Default, Clone, Copy)]
pub struct Argon2PasswordHasher;

impl Argon2PasswordHasher {
    pub fn new() -> Self {
        Self
    }
}

impl PasswordHasher for Argon2PasswordHasher {
    fn hash(&self, password: &str) -> Result<PasswordHash, DomainError> {
        let salt = SaltString::generate(&mut OsRng);
        let encoded = Argon2::default()
            .hash_password(password.as_bytes(), &salt)
            .map_err(|e| {
                tracing::error!("Failed to hash password: {}", e);
                DomainError::new(ErrorCode::InternalError, "Failed to hash password")
            })?;
        Ok(PasswordHash::new(encoded.to_string()))
    }

    fn verify(&self, password: &str, hash: &PasswordHash) -> bool {
        let Ok(parsed) = EncodedHash::new(hash.as_str()) else {
            tracing::warn!("Stored password hash is not a PHC string");
            return false;
        };
        Argon2::default()
            .verify_password(password.as_bytes(), &parsed)
            .is_ok()
    }
}
