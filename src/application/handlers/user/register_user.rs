//! RegisterUserHandler - Command handler for signing up with a password.

use std::sync::Arc;

use tracing::info;

use crate::domain::user::{validate_password, User, UserError};
use crate::ports::{PasswordHasher, UserRepository};

#[derive(Clone)]
pub struct RegisterUserCommand {
    pub username: String,
    pub email: String,
    pub phone_number: String,
    pub password: String,
}

impl std::fmt::Debug for RegisterUserCommand {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RegisterUserCommand")
            .field("username", &self.username)
            .field("email", &self.email)
            .field("phone_number", &self.phone_number)
            .finish_non_exhaustive()
    }
}

pub struct RegisterUserHandler {
    users: Arc<dyn UserRepository>,
    hasher: Arc<dyn PasswordHasher>,
}

impl RegisterUserHandler {
    pub fn new(users: Arc<dyn UserRepository>, hasher: Arc<dyn PasswordHasher>) -> Self {
        Self { users, hasher }
    }

    /// New accounts are active and never superusers.
    pub async fn handle(&self, cmd: RegisterUserCommand) -> Result<User, UserError> {
        let user = User::new(cmd.username, &cmd.email, &cmd.phone_number)?;
        validate_password(&cmd.password)?;

        let user = user.with_password_hash(self.hasher.hash(&cmd.password)?);
        self.users.save(&user).await?;

        info!(user_id = %user.id, "user registered");
        Ok(user)
    }
}
