//! User accounts and the request principal.

mod credentials;
mod errors;
mod principal;
#[allow(clippy::module_inception)]
mod user;

pub use credentials::{validate_password, PasswordHash};
pub use errors::UserError;
pub use principal::Principal;
pub use user::{normalize_email, normalize_phone, User, UserChanges};
