//! Authentication adapters.
//!
//! - `jwt` - HS256 shared-secret tokens, issued at login and validated per request
//! - `mock` - Session validator for tests that doesn't require signing keys
//! - `password` - Argon2 password hashing

mod jwt;
mod mock;
mod password;

pub use jwt::{issue_token, JwtConfig, JwtSessionValidator, JwtTokenIssuer, SessionClaims};
pub use password::Argon2PasswordHasher;
pub use mock::MockSessionValidator;
