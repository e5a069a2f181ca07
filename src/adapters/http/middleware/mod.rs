//! HTTP middleware for axum.
//!
//! - `auth` - bearer session resolution and the `Session` extractors

pub mod auth;

pub use auth::{session_middleware, AuthState, MissingSession, OptionalSession, Session};
