//! UpdateUserHandler - Command handler for profile and password edits.

use std::sync::Arc;

use tracing::{debug, info};

use crate::domain::access::{can_edit, DenialReason, EditTarget};
use crate::domain::foundation::{ErrorCode, UserId};
use crate::domain::user::{validate_password, Principal, User, UserChanges, UserError};
use crate::ports::{PasswordHasher, UserRepository};

#[derive(Clone)]
pub struct UpdateUserCommand {
    pub principal: Principal,
    pub user_id: UserId,
    pub changes: UserChanges,
    pub new_password: Option<String>,
}

impl std::fmt::Debug for UpdateUserCommand {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("UpdateUserCommand")
            .field("user_id", &self.user_id)
            .field("changes", &self.changes)
            .field("new_password", &self.new_password.as_ref().map(|_| "[REDACTED]"))
            .finish_non_exhaustive()
    }
}

pub struct UpdateUserHandler {
    users: Arc<dyn UserRepository>,
    hasher: Arc<dyn PasswordHasher>,
}

impl UpdateUserHandler {
    pub fn new(users: Arc<dyn UserRepository>, hasher: Arc<dyn PasswordHasher>) -> Self {
        Self { users, hasher }
    }

    pub async fn handle(&self, cmd: UpdateUserCommand) -> Result<User, UserError> {
        if !cmd.principal.is_authenticated() {
            return Err(UserError::access_denied(DenialReason::NotAuthenticated));
        }

        let mut user = self
            .users
            .find_by_id(&cmd.user_id)
            .await?
            .ok_or(UserError::not_found(cmd.user_id))?;

        can_edit(&cmd.principal, EditTarget::Account(&user))
            .into_result()
            .map_err(|reason| {
                debug!(user_id = %user.id, reason = reason.code(), "account edit denied");
                UserError::access_denied(reason)
            })?;

        user.apply(cmd.changes)?;
        if let Some(password) = cmd.new_password {
            validate_password(&password)?;
            user.password_hash = Some(self.hasher.hash(&password)?);
        }

        self.users
            .update(&user)
            .await
            .map_err(|err| match err.code {
                ErrorCode::UserNotFound => UserError::not_found(user.id),
                _ => err.into(),
            })?;

        info!(user_id = %user.id, "user updated");
        Ok(user)
    }
}
