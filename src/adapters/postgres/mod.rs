//! PostgreSQL adapters - Database implementations for repository ports.
//!
//! - `PostgresCatalogReader` - Courses and lessons
//! - `PostgresCatalogRepository` - Course and lesson authoring
//! - `PostgresUserRepository` - Users with bought and started courses
//! - `PostgresPaymentRepository` - Payments and transactional settle-and-grant

mod catalog_reader;
mod catalog_repository;
mod payment_repository;
mod user_repository;

pub use catalog_reader::PostgresCatalogReader;
pub use catalog_repository::PostgresCatalogRepository;
pub use payment_repository::PostgresPaymentRepository;
pub use user_repository::PostgresUserRepository;
