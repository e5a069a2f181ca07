//! Password hashing port.

use crate::domain::foundation::DomainError;
use crate::domain::user::PasswordHash;

/// One-way password hashing with per-password salts.
pub trait PasswordHasher: Send + Sync {
    fn hash(&self, password: &str) -> Result<PasswordHash, DomainError>;

    /// Whether `password` matches `hash`. Malformed hashes never match.
    fn verify(&self, password: &str, hash: &PasswordHash) -> bool;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn password_hasher_is_object_safe() {
        fn _accepts_dyn(_hasher: &dyn PasswordHasher) {}
    }
}
