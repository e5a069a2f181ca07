//! LoginHandler - Exchanges a phone number and password for a bearer token.
//!
//! Unknown numbers, inactive accounts, accounts without a password and
//! wrong passwords all yield the same `InvalidCredentials`.

use std::sync::Arc;

use tracing::{debug, info};

use crate::domain::user::{normalize_phone, UserError};
use crate::ports::{IssuedToken, PasswordHasher, TokenIssuer, UserRepository};

#[derive(Clone)]
pub struct LoginCommand {
    pub phone_number: String,
    pub password: String,
}

impl std::fmt::Debug for LoginCommand {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("LoginCommand")
            .field("phone_number", &self.phone_number)
            .finish_non_exhaustive()
    }
}

pub struct LoginHandler {
    users: Arc<dyn UserRepository>,
    hasher: Arc<dyn PasswordHasher>,
    tokens: Arc<dyn TokenIssuer>,
}

impl LoginHandler {
    pub fn new(
        users: Arc<dyn UserRepository>,
        hasher: Arc<dyn PasswordHasher>,
        tokens: Arc<dyn TokenIssuer>,
    ) -> Self {
        Self {
            users,
            hasher,
            tokens,
        }
    }

    pub async fn handle(&self, cmd: LoginCommand) -> Result<IssuedToken, UserError> {
        let Ok(phone_number) = normalize_phone(&cmd.phone_number) else {
            return Err(UserError::InvalidCredentials);
        };

        let user = self
            .users
            .find_by_phone(&phone_number)
            .await?
            .filter(|user| user.is_active)
            .ok_or(UserError::InvalidCredentials)?;

        let verified = user
            .password_hash
            .as_ref()
            .is_some_and(|hash| self.hasher.verify(&cmd.password, hash));
        if !verified {
            debug!(user_id = %user.id, "login rejected");
            return Err(UserError::InvalidCredentials);
        }

        let token = self
            .tokens
            .issue(&user.id, Some(&user.email))
            .map_err(|e| UserError::infrastructure(e.to_string()))?;

        info!(user_id = %user.id, "user logged in");
        Ok(token)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::adapters::auth::{JwtConfig, JwtSessionValidator, JwtTokenIssuer};
    use crate::adapters::memory::InMemoryStore;
    use crate::application::handlers::user::fixtures::PlainHasher;
    use crate::domain::user::User;
    use crate::ports::SessionValidator;
    use secrecy::SecretString;

    fn jwt() -> JwtConfig {
        JwtConfig::new(
            SecretString::new("login-test-secret-that-is-long-enough".to_string()),
            "paperskill-accounts",
            "paperskill-api",
        )
    }

    async fn setup(user: User) -> LoginHandler {
        let store = InMemoryStore::new();
        store.insert_user(user).await;
        LoginHandler::new(
            Arc::new(store),
            Arc::new(PlainHasher),
            Arc::new(JwtTokenIssuer::new(jwt())),
        )
    }

    fn with_password(user: User, password: &str) -> User {
        let hash = PlainHasher.hash(password).unwrap();
        user.with_password_hash(hash)
    }

    fn ada() -> User {
        User::new("ada", "ada@example.com", "+15550001234").unwrap()
    }

    fn login(phone: &str, password: &str) -> LoginCommand {
        LoginCommand {
            phone_number: phone.to_string(),
            password: password.to_string(),
        }
    }

    #[tokio::test]
    async fn correct_password_yields_token_for_the_user() {
        let user = with_password(ada(), "correct horse");
        let handler = setup(user.clone()).await;

        let token = handler
            .handle(login("+1 (555) 000-1234", "correct horse"))
            .await
            .unwrap();

        let session = JwtSessionValidator::new(jwt())
            .validate(&token.access_token)
            .await
            .unwrap();
        assert_eq!(session.id, user.id);
        assert_eq!(token.expires_in, 3600);
    }

    #[tokio::test]
    async fn wrong_password_and_unknown_phone_look_the_same() {
        let handler = setup(with_password(ada(), "correct horse")).await;

        let wrong = handler.handle(login("+15550001234", "battery staple")).await;
        let unknown = handler.handle(login("+15559999999", "correct horse")).await;
        let garbage = handler.handle(login("not a phone", "correct horse")).await;

        assert_eq!(wrong.unwrap_err(), UserError::InvalidCredentials);
        assert_eq!(unknown.unwrap_err(), UserError::InvalidCredentials);
        assert_eq!(garbage.unwrap_err(), UserError::InvalidCredentials);
    }

    #[tokio::test]
    async fn inactive_or_passwordless_accounts_cannot_log_in() {
        let mut inactive = with_password(ada(), "correct horse");
        inactive.is_active = false;
        let handler = setup(inactive).await;
        assert_eq!(
            handler
                .handle(login("+15550001234", "correct horse"))
                .await
                .unwrap_err(),
            UserError::InvalidCredentials
        );

        let handler = setup(ada()).await;
        assert_eq!(
            handler
                .handle(login("+15550001234", "correct horse"))
                .await
                .unwrap_err(),
            UserError::InvalidCredentials
        );
    }
}
