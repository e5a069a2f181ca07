//! Application handlers.
//!
//! Command and query handlers that orchestrate domain operations.

pub mod catalog;
pub mod payment;
mod principal;
pub mod user;

pub use principal::PrincipalResolver;
