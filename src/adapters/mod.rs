//! Adapters - Implementations of port interfaces.
//!
//! Adapters connect the domain to external systems:
//! - `auth` - JWT sessions and password hashing
//! - `http` - axum REST API
//! - `memory` - In-memory persistence for tests and local runs
//! - `postgres` - PostgreSQL persistence (sqlx)
//! - `stripe` - Stripe payment gateway

pub mod auth;
pub mod http;
pub mod memory;
pub mod postgres;
pub mod stripe;

pub use auth::{Argon2PasswordHasher, JwtSessionValidator, JwtTokenIssuer, MockSessionValidator};
pub use memory::InMemoryStore;
pub use postgres::{
    PostgresCatalogReader, PostgresCatalogRepository, PostgresPaymentRepository,
    PostgresUserRepository,
};
pub use stripe::{MockPaymentGateway, StripeConfig, StripeGateway};
