//! Password rules and the stored password hash.

use std::fmt;

use crate::domain::foundation::ValidationError;

const MIN_PASSWORD_CHARS: usize = 8;
const MAX_PASSWORD_CHARS: usize = 128;

/// Encoded password hash in PHC string format.
///
/// `Debug` never prints the hash.
#[derive(Clone, PartialEq, Eq)]
pub struct PasswordHash(String);

impl PasswordHash {
    pub fn new(encoded: impl Into<String>) -> Self {
        Self(encoded.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Debug for PasswordHash {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("PasswordHash(..)")
    }
}

/// Checks a plaintext password before it is hashed.
pub fn validate_password(password: &str) -> Result<(), ValidationError> {
    let chars = password.chars().count();
    if chars == 0 {
        return Err(ValidationError::empty_field("password"));
    }
    if chars < MIN_PASSWORD_CHARS {
        return Err(ValidationError::invalid_format(
            "password",
            format!("must be at least {} characters", MIN_PASSWORD_CHARS),
        ));
    }
    if chars > MAX_PASSWORD_CHARS {
        return Err(ValidationError::invalid_format(
            "password",
            format!("must be at most {} characters", MAX_PASSWORD_CHARS),
        ));
    }
    if password.chars().all(|c| c.is_ascii_digit()) {
        return Err(ValidationError::invalid_format(
            "password",
            "cannot be entirely numeric",
        ));
    }
    Ok(())
}
