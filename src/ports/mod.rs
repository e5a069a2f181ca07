//! Ports - Interfaces for external dependencies.
//!
//! Following hexagonal architecture, ports define the contracts between
//! the domain and the outside world. Adapters implement these ports.
//!
//! ## Persistence Ports
//!
//! - `CatalogReader` - Courses and lessons (read side)
//! - `CatalogRepository` - Authoring courses and lessons
//! - `UserRepository` - Users, credentials, started courses
//! - `PaymentRepository` - Payments and the atomic settle-and-grant
//!
//! ## External Service Ports
//!
//! - `PaymentGateway` - Card processor (products, prices, checkout, webhooks)
//! - `SessionValidator` - Bearer token validation
//! - `TokenIssuer` - Bearer token signing at login
//! - `PasswordHasher` - Credential hashing

mod catalog_reader;
mod catalog_repository;
mod password_hasher;
mod payment_gateway;
mod payment_repository;
mod session_validator;
mod token_issuer;
mod user_repository;

pub use catalog_reader::{CatalogReader, CourseSummary};
pub use catalog_repository::CatalogRepository;
pub use password_hasher::PasswordHasher;
pub use payment_gateway::{
    CheckoutSession, CheckoutSessionStatus, CheckoutUpdate, CreateCheckoutSessionRequest,
    GatewayError, GatewayErrorKind, GatewayPrice, GatewayProduct, PaymentGateway, WebhookEvent,
};
pub use payment_repository::{PaymentFilter, PaymentOrder, PaymentRepository, TransitionOutcome};
pub use session_validator::SessionValidator;
pub use token_issuer::{IssuedToken, TokenIssuer};
pub use user_repository::UserRepository;
