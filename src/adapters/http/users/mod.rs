//! HTTP adapter for account endpoints.
//!
//! - `POST /api/users` - Register
//! - `PATCH /api/users/:user_id` - Edit a profile or password
//! - `POST /api/token` - Exchange phone number and password for a bearer token

pub mod dto;
pub mod handlers;
pub mod routes;

pub use dto::*;
pub use routes::{token_routes, user_routes};
