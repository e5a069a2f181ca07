//! HTTP adapters - REST API implementations.
//!
//! Each domain module has its own HTTP adapter for endpoint exposure.

pub mod courses;
pub mod error;
pub mod middleware;
pub mod payments;
pub mod router;
pub mod state;
pub mod users;

// Re-export key types for convenience
pub use error::{ApiError, ErrorResponse};
pub use router::api_router;
pub use state::AppState;
