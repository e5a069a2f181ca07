//! Mock authentication adapter for testing.
//!
//! Implements the `SessionValidator` port without any signing keys.
//!
//! # Example
//!
//! ```ignore
//! use paperskill::adapters::auth::MockSessionValidator;
//!
//! let validator = MockSessionValidator::new().with_test_user("valid-token", user.id);
//! let result = validator.validate("valid-token").await;
//! assert!(result.is_ok());
//! ```

use std::collections::HashMap;
use std::sync::{PoisonError, RwLock};

use async_trait::async_trait;

use crate::domain::foundation::{AuthError, AuthenticatedUser, UserId};
use crate::ports::SessionValidator;

/// Mock session validator for testing.
///
/// Stores a map of tokens to users. Tokens not in the map return `InvalidToken`.
#[derive(Debug, Default)]
pub struct MockSessionValidator {
    tokens: RwLock<HashMap<String, AuthenticatedUser>>,
    /// Returned for every validation while set.
    force_error: RwLock<Option<AuthError>>,
}

impl MockSessionValidator {
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds a valid token that maps to a user.
    pub fn with_user(self, token: impl Into<String>, user: AuthenticatedUser) -> Self {
        self.add_token(token, user);
        self
    }

    /// Adds a valid token for `user_id` with no email claim.
    pub fn with_test_user(self, token: impl Into<String>, user_id: UserId) -> Self {
        self.with_user(token, AuthenticatedUser::new(user_id, None))
    }

    /// Forces all validations to return the specified error.
    pub fn with_error(self, error: AuthError) -> Self {
        *self
            .force_error
            .write()
            .unwrap_or_else(PoisonError::into_inner) = Some(error);
        self
    }

    pub fn clear_error(&self) {
        *self
            .force_error
            .write()
            .unwrap_or_else(PoisonError::into_inner) = None;
    }

    /// Registers a new valid token at runtime.
    pub fn add_token(&self, token: impl Into<String>, user: AuthenticatedUser) {
        self.tokens
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .insert(token.into(), user);
    }

    pub fn remove_token(&self, token: &str) {
        self.tokens
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .remove(token);
    }
}

#[async_trait]
impl SessionValidator for MockSessionValidator {
    async fn validate(&self, token: &str) -> Result<AuthenticatedUser, AuthError> {
        if let Some(error) = self
            .force_error
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
        {
            return Err(error);
        }

        self.tokens
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .get(token)
            .cloned()
            .ok_or(AuthError::InvalidToken)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn registered_token_validates() {
        let id = UserId::new();
        let validator = MockSessionValidator::new().with_test_user("t1", id);
        assert_eq!(validator.validate("t1").await.unwrap().id, id);
    }

    #[tokio::test]
    async fn unknown_and_removed_tokens_fail() {
        let validator = MockSessionValidator::new().with_test_user("t1", UserId::new());
        assert_eq!(validator.validate("t2").await, Err(AuthError::InvalidToken));

        validator.remove_token("t1");
        assert_eq!(validator.validate("t1").await, Err(AuthError::InvalidToken));
    }

    #[tokio::test]
    async fn forced_error_wins_until_cleared() {
        let validator = MockSessionValidator::new()
            .with_test_user("t1", UserId::new())
            .with_error(AuthError::service_unavailable("down"));
        assert!(validator.validate("t1").await.is_err());

        validator.clear_error();
        assert!(validator.validate("t1").await.is_ok());
    }
}
