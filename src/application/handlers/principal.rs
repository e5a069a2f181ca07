//! Resolves the request principal from a validated session.

use std::sync::Arc;

use tracing::debug;

use crate::domain::foundation::{AuthenticatedUser, DomainError};
use crate::domain::user::Principal;
use crate::ports::UserRepository;

/// Loads the user account behind a validated token.
///
/// A token for an unknown or deactivated account resolves to `Anonymous`,
/// so the access evaluator sees the same principal it would for a request
/// without a token.
#[derive(Clone)]
pub struct PrincipalResolver {
    users: Arc<dyn UserRepository>,
}

impl PrincipalResolver {
    pub fn new(users: Arc<dyn UserRepository>) -> Self {
        Self { users }
    }

    pub async fn resolve(
        &self,
        session: Option<&AuthenticatedUser>,
    ) -> Result<Principal, DomainError> {
        let Some(session) = session else {
            return Ok(Principal::Anonymous);
        };

        match self.users.find_by_id(&session.id).await? {
            Some(user) if user.is_active => Ok(Principal::Authenticated(user)),
            Some(_) => {
                debug!(user_id = %session.id, "token belongs to inactive user");
                Ok(Principal::Anonymous)
            }
            None => {
                debug!(user_id = %session.id, "token belongs to unknown user");
                Ok(Principal::Anonymous)
            }
        }
    }
}
