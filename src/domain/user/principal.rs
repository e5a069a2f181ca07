//! The actor behind a request.

use crate::domain::foundation::UserId;

use super::User;

/// Either nobody in particular or a loaded user account.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Principal {
    Anonymous,
    Authenticated(User),
}

impl Principal {
    pub fn user(&self) -> Option<&User> {
        match self {
            Principal::Anonymous => None,
            Principal::Authenticated(user) => Some(user),
        }
    }

    pub fn user_id(&self) -> Option<&UserId> {
        self.user().map(|user| &user.id)
    }

    pub fn is_authenticated(&self) -> bool {
        matches!(self, Principal::Authenticated(_))
    }
}

impl From<Option<User>> for Principal {
    fn from(user: Option<User>) -> Self {
        user.map_or(Principal::Anonymous, Principal::Authenticated)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn anonymous_has_no_user() {
        let principal = Principal::Anonymous;
        assert!(!principal.is_authenticated());
        assert!(principal.user_id().is_none());
    }

    #[test]
    fn from_option_wraps_loaded_user() {
        let user = User::new("carol", "carol@example.com", "+15550002222").unwrap();
        let id = user.id;
        let principal = Principal::from(Some(user));
        assert!(principal.is_authenticated());
        assert_eq!(principal.user_id(), Some(&id));
    }
}
