//! Data Transfer Objects for account endpoints.

use serde::{Deserialize, Serialize};

use crate::domain::foundation::{Timestamp, UserId};
use crate::domain::user::{User, UserChanges};
use crate::ports::IssuedToken;

#[derive(Clone, Deserialize)]
pub struct RegisterUserRequest {
    pub username: String,
    pub email: String,
    pub phone_number: String,
    pub password: String,
}

/// Body of `PATCH /api/users/:user_id`. Absent fields are left alone.
#[derive(Clone, Default, Deserialize)]
pub struct UpdateUserRequest {
    pub username: Option<String>,
    pub email: Option<String>,
    pub phone_number: Option<String>,
    pub password: Option<String>,
}

impl UpdateUserRequest {
    pub fn changes(&self) -> UserChanges {
        UserChanges {
            username: self.username.clone(),
            email: self.email.clone(),
            phone_number: self.phone_number.clone(),
        }
    }
}

#[derive(Clone, Deserialize)]
pub struct TokenRequest {
    pub phone_number: String,
    pub password: String,
}

/// Account as shown to its owner. Grants and password never leave the server.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UserResponse {
    pub id: UserId,
    pub username: String,
    pub email: String,
    pub phone_number: String,
    pub is_superuser: bool,
    pub created_at: Timestamp,
}

impl From<&User> for UserResponse {
    fn from(user: &User) -> Self {
        Self {
            id: user.id,
            username: user.username.clone(),
            email: user.email.clone(),
            phone_number: user.phone_number.clone(),
            is_superuser: user.is_superuser,
            created_at: user.created_at,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TokenResponse {
    pub access_token: String,
    /// Always `Bearer`.
    pub token_type: String,
    pub expires_in: u64,
}

impl From<IssuedToken> for TokenResponse {
    fn from(token: IssuedToken) -> Self {
        Self {
            access_token: token.access_token,
            token_type: "Bearer".to_string(),
            expires_in: token.expires_in,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::user::PasswordHash;

    #[test]
    fn user_response_omits_credentials() {
        let user = User::new("ada", "ada@example.com", "+15550001234")
            .unwrap()
            .with_password_hash(PasswordHash::new("$argon2id$secret"));

        let json = serde_json::to_value(UserResponse::from(&user)).unwrap();

        assert_eq!(json["username"], "ada");
        assert!(json.get("password_hash").is_none());
        assert!(json.get("bought_courses").is_none());
    }

    #[test]
    fn token_response_is_bearer() {
        let json = serde_json::to_value(TokenResponse::from(IssuedToken {
            access_token: "abc".to_string(),
            expires_in: 60,
        }))
        .unwrap();
        assert_eq!(json["token_type"], "Bearer");
        assert_eq!(json["expires_in"], 60);
    }
}
