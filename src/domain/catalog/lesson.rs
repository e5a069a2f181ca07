//! Lesson entity.

use serde::{Deserialize, Serialize};

use crate::domain::foundation::{CourseId, LessonId, Owned, Timestamp, UserId, ValidationError};

/// Edits to an existing lesson. The course a lesson belongs to never changes.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct LessonChanges {
    pub name: Option<String>,
    pub description: Option<String>,
    pub video_url: Option<String>,
    pub position: Option<u32>,
}

impl LessonChanges {
    pub fn is_empty(&self) -> bool {
        self == &LessonChanges::default()
    }
}

/// A lesson. Belongs to exactly one course for its whole life.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Lesson {
    pub id: LessonId,
    pub course_id: CourseId,
    pub name: String,
    pub description: Option<String>,
    pub video_url: Option<String>,
    pub owner: Option<UserId>,
    /// Ordering key within the course, lowest first.
    pub position: u32,
    pub created_at: Timestamp,
}

impl Lesson {
    pub fn new(
        course_id: CourseId,
        name: impl Into<String>,
        owner: Option<UserId>,
    ) -> Result<Self, ValidationError> {
        let name = checked_name(name.into())?;

        Ok(Self {
            id: LessonId::new(),
            course_id,
            name,
            description: None,
            video_url: None,
            owner,
            position: 0,
            created_at: Timestamp::now(),
        })
    }

    pub fn with_position(mut self, position: u32) -> Self {
        self.position = position;
        self
    }

    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }

    pub fn with_video_url(mut self, url: impl Into<String>) -> Self {
        self.video_url = Some(url.into());
        self
    }

    pub fn belongs_to(&self, course_id: &CourseId) -> bool {
        &self.course_id == course_id
    }

    /// Applies `changes`; nothing is modified if any of them is invalid.
    pub fn apply(&mut self, changes: LessonChanges) -> Result<(), ValidationError> {
        let name = changes.name.map(checked_name).transpose()?;

        if let Some(name) = name {
            self.name = name;
        }
        if let Some(description) = changes.description {
            self.description = Some(description);
        }
        if let Some(video_url) = changes.video_url {
            self.video_url = Some(video_url);
        }
        if let Some(position) = changes.position {
            self.position = position;
        }
        Ok(())
    }
}

fn checked_name(name: String) -> Result<String, ValidationError> {
    if name.trim().is_empty() {
        return Err(ValidationError::empty_field("name"));
    }
    Ok(name)
}

impl Owned for Lesson {
    fn owner(&self) -> Option<&UserId> {
        self.owner.as_ref()
    }
}
