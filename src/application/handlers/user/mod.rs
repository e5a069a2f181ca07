//! Account handlers.
//!
//! ## Commands
//! - Registration with a password
//! - Profile and password edits, by the account itself or a superuser
//! - Password login issuing a bearer token

mod login;
mod register_user;
mod update_user;

pub use login::{LoginCommand, LoginHandler};
pub use register_user::{RegisterUserCommand, RegisterUserHandler};
pub use update_user::{UpdateUserCommand, UpdateUserHandler};

#[cfg(test)]
pub(crate) mod fixtures {
    use crate::domain::foundation::DomainError;
    use crate::domain::user::PasswordHash;
    use crate::ports::PasswordHasher;

    /// Reversible stand-in so handler tests do not pay for Argon2.
    pub struct PlainHasher;

    impl PasswordHasher for PlainHasher {
        fn hash(&self, password: &str) -> Result<PasswordHash, DomainError> {
            Ok(PasswordHash::new(format!("plain:{}", password)))
        }

        fn verify(&self, password: &str, hash: &PasswordHash) -> bool {
            hash.as_str() == format!("plain:{}", password)
        }
    }
}
