//! Domain layer containing business logic and domain types.
//!
//! # Module Organization
//!
//! - `foundation` - Shared domain primitives (IDs, timestamps, errors, state machine)
//! - `catalog` - Courses, lessons and their pricing
//! - `user` - User accounts and the request principal
//! - `access` - Pure access evaluator for viewing and editing content
//! - `payment` - Payment aggregate, gateway intent and error taxonomy

pub mod access;
pub mod catalog;
pub mod foundation;
pub mod payment;
pub mod user;
