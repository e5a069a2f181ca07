//! Catalog module - courses and lessons.
//!
//! Courses carry their pricing as a sum type so the paid flag and price can
//! never disagree. Lessons hang off exactly one course.

mod category;
mod course;
mod errors;
mod lesson;
mod price;

pub use category::CourseCategory;
pub use course::{Course, CourseChanges};
pub use errors::CatalogError;
pub use lesson::{Lesson, LessonChanges};
pub use price::{CoursePricing, Price};
