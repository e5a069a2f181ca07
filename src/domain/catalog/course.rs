//! Course aggregate.

use serde::{Deserialize, Serialize};

use crate::domain::foundation::{CourseId, Owned, Timestamp, UserId, ValidationError};

use super::{CourseCategory, CoursePricing, Price};

/// Edits to an existing course. `None` leaves the field as it is.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CourseChanges {
    pub name: Option<String>,
    pub description: Option<String>,
    pub category: Option<CourseCategory>,
    pub video_url: Option<String>,
    pub pricing: Option<CoursePricing>,
}

impl CourseChanges {
    pub fn is_empty(&self) -> bool {
        self == &CourseChanges::default()
    }
}

/// A course in the catalog.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Course {
    pub id: CourseId,
    pub name: String,
    pub description: Option<String>,
    pub category: Option<CourseCategory>,
    pub video_url: Option<String>,
    /// Author of the course. Seeded courses may have no owner.
    pub owner: Option<UserId>,
    pub pricing: CoursePricing,
    pub created_at: Timestamp,
}

impl Course {
    /// Creates a new course with a fresh id.
    pub fn new(
        name: impl Into<String>,
        owner: Option<UserId>,
        pricing: CoursePricing,
    ) -> Result<Self, ValidationError> {
        let name = checked_name(name.into())?;

        Ok(Self {
            id: CourseId::new(),
            name,
            description: None,
            category: None,
            video_url: None,
            owner,
            pricing,
            created_at: Timestamp::now(),
        })
    }

    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }

    pub fn with_category(mut self, category: CourseCategory) -> Self {
        self.category = Some(category);
        self
    }

    pub fn with_video_url(mut self, url: impl Into<String>) -> Self {
        self.video_url = Some(url.into());
        self
    }

    /// Applies `changes`; nothing is modified if any of them is invalid.
    pub fn apply(&mut self, changes: CourseChanges) -> Result<(), ValidationError> {
        let name = changes.name.map(checked_name).transpose()?;

        if let Some(name) = name {
            self.name = name;
        }
        if let Some(description) = changes.description {
            self.description = Some(description);
        }
        if let Some(category) = changes.category {
            self.category = Some(category);
        }
        if let Some(video_url) = changes.video_url {
            self.video_url = Some(video_url);
        }
        if let Some(pricing) = changes.pricing {
            self.pricing = pricing;
        }
        Ok(())
    }

    pub fn is_paid(&self) -> bool {
        self.pricing.is_paid()
    }

    pub fn price(&self) -> Option<&Price> {
        self.pricing.price()
    }
}

fn checked_name(name: String) -> Result<String, ValidationError> {
    if name.trim().is_empty() {
        return Err(ValidationError::empty_field("name"));
    }
    Ok(name)
}

impl Owned for Course {
    fn owner(&self) -> Option<&UserId> {
        self.owner.as_ref()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    #[test]
    fn new_course_rejects_blank_name() {
        let result = Course::new("   ", None, CoursePricing::Free);
        assert_eq!(result, Err(ValidationError::empty_field("name")));
    }

    #[test]
    fn paid_course_exposes_price() {
        let price = Price::new(dec!(500)).unwrap();
        let course = Course::new("Rust", None, CoursePricing::Paid(price)).unwrap();
        assert!(course.is_paid());
        assert_eq!(course.price(), Some(&price));
    }

    #[test]
    fn free_course_has_no_price() {
        let course = Course::new("Intro", None, CoursePricing::Free)
            .unwrap()
            .with_category(CourseCategory::It)
            .with_description("Basics");
        assert!(!course.is_paid());
        assert!(course.price().is_none());
        assert_eq!(course.category, Some(CourseCategory::It));
    }

    #[test]
    fn apply_updates_only_given_fields() {
        let mut course = Course::new("Rust", None, CoursePricing::Free)
            .unwrap()
            .with_description("Basics");

        course
            .apply(CourseChanges {
                name: Some("Advanced Rust".into()),
                pricing: Some(CoursePricing::Paid(Price::new(dec!(990)).unwrap())),
                ..Default::default()
            })
            .unwrap();

        assert_eq!(course.name, "Advanced Rust");
        assert_eq!(course.description.as_deref(), Some("Basics"));
        assert_eq!(course.price().map(Price::amount), Some(dec!(990)));
    }

    #[test]
    fn apply_with_blank_name_changes_nothing() {
        let mut course = Course::new("Rust", None, CoursePricing::Free).unwrap();
        let before = course.clone();

        let result = course.apply(CourseChanges {
            name: Some(" ".into()),
            category: Some(CourseCategory::Design),
            ..Default::default()
        });

        assert_eq!(result, Err(ValidationError::empty_field("name")));
        assert_eq!(course, before);
    }

    #[test]
    fn ownership_follows_owner_field() {
        let author = UserId::new();
        let course = Course::new("Rust", Some(author), CoursePricing::Free).unwrap();
        assert!(course.is_owned_by(&author));
        assert!(!course.is_owned_by(&UserId::new()));
    }
}
