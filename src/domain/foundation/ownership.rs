//! Ownership trait for catalog resources.
//!
//! Courses and lessons may be authored by a user or be ownerless (seeded
//! content). `Owned` gives both a single way to ask "did this user author it".

use super::UserId;

/// Resources with an optional owning user.
pub trait Owned {
    /// Returns the owner, if the resource has one.
    fn owner(&self) -> Option<&UserId>;

    /// Returns true when `user_id` is the owner. Ownerless resources
    /// belong to nobody.
    fn is_owned_by(&self, user_id: &UserId) -> bool {
        self.owner() == Some(user_id)
    }
}
