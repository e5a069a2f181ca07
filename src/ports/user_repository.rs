//! User repository port.
//!
//! Bought courses are written only by `PaymentRepository::complete_and_grant`;
//! this port never adds to them.

use crate::domain::foundation::{CourseId, DomainError, UserId};
use crate::domain::user::User;
use async_trait::async_trait;

#[async_trait]
pub trait UserRepository: Send + Sync {
    /// Load a user with their bought and started courses.
    async fn find_by_id(&self, id: &UserId) -> Result<Option<User>, DomainError>;

    /// Load a user by normalised phone number, the login identifier.
    async fn find_by_phone(&self, phone_number: &str) -> Result<Option<User>, DomainError>;

    /// Insert a new user together with their password hash, if any.
    ///
    /// # Errors
    ///
    /// - `Conflict` if the username, email or phone number is taken
    async fn save(&self, user: &User) -> Result<(), DomainError>;

    /// Overwrite profile fields and password hash of an existing user.
    ///
    /// Grants and flags are not touched.
    ///
    /// # Errors
    ///
    /// - `UserNotFound` if the user does not exist
    /// - `Conflict` if the new username, email or phone number is taken
    async fn update(&self, user: &User) -> Result<(), DomainError>;

    /// Record that the user started a course.
    ///
    /// Returns `false` if it was already recorded.
    async fn add_started_course(
        &self,
        user_id: &UserId,
        course_id: &CourseId,
    ) -> Result<bool, DomainError>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn user_repository_is_object_safe() {
        fn _accepts_dyn(_repo: &dyn UserRepository) {}
    }
}
