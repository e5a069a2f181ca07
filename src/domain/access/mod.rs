//! Access control for catalog content.

mod decision;
mod evaluator;

pub use decision::{AccessDecision, DenialReason};
pub use evaluator::{can_edit, can_view_course, can_view_lesson, EditTarget};
