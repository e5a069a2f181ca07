//! Data Transfer Objects for course endpoints.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::application::handlers::catalog::{CourseDetail, LessonDetail, StartCourseResult};
use crate::domain::catalog::{
    Course, CourseCategory, CourseChanges, CoursePricing, Lesson, LessonChanges,
};
use crate::domain::foundation::{CourseId, LessonId, Timestamp, UserId, ValidationError};
use crate::ports::CourseSummary;

// ════════════════════════════════════════════════════════════════════════════════
// Request DTOs
// ════════════════════════════════════════════════════════════════════════════════

/// Body of `POST /api/courses`.
#[derive(Debug, Clone, Deserialize)]
pub struct CreateCourseRequest {
    pub name: String,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub category: Option<CourseCategory>,
    #[serde(default)]
    pub video_url: Option<String>,
    #[serde(default)]
    pub is_paid: bool,
    #[serde(default)]
    pub price: Option<Decimal>,
}

impl CreateCourseRequest {
    pub fn pricing(&self) -> Result<CoursePricing, ValidationError> {
        CoursePricing::from_parts(self.is_paid, self.price)
    }
}

/// Body of `PATCH /api/courses/:course_id`. Absent fields are left alone.
///
/// Sending `price` alone makes the course paid at that price; sending
/// `is_paid: false` alone makes it free.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct UpdateCourseRequest {
    pub name: Option<String>,
    pub description: Option<String>,
    pub category: Option<CourseCategory>,
    pub video_url: Option<String>,
    pub is_paid: Option<bool>,
    pub price: Option<Decimal>,
}

impl TryFrom<UpdateCourseRequest> for CourseChanges {
    type Error = ValidationError;

    fn try_from(req: UpdateCourseRequest) -> Result<Self, Self::Error> {
        let pricing = match (req.is_paid, req.price) {
            (None, None) => None,
            (is_paid, price) => Some(CoursePricing::from_parts(
                is_paid.unwrap_or(price.is_some()),
                price,
            )?),
        };
        Ok(CourseChanges {
            name: req.name,
            description: req.description,
            category: req.category,
            video_url: req.video_url,
            pricing,
        })
    }
}

/// Body of `POST /api/courses/:course_id/lessons`.
#[derive(Debug, Clone, Deserialize)]
pub struct CreateLessonRequest {
    pub name: String,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub video_url: Option<String>,
    /// Appended after existing lessons when absent.
    #[serde(default)]
    pub position: Option<u32>,
}

/// Body of `PATCH /api/courses/:course_id/lessons/:lesson_id`.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct UpdateLessonRequest {
    pub name: Option<String>,
    pub description: Option<String>,
    pub video_url: Option<String>,
    pub position: Option<u32>,
}

impl From<UpdateLessonRequest> for LessonChanges {
    fn from(req: UpdateLessonRequest) -> Self {
        LessonChanges {
            name: req.name,
            description: req.description,
            video_url: req.video_url,
            position: req.position,
        }
    }
}

// ════════════════════════════════════════════════════════════════════════════════
// Response DTOs
// ════════════════════════════════════════════════════════════════════════════════

/// Course fields shared by list and detail responses.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CourseView {
    pub id: CourseId,
    pub name: String,
    pub description: Option<String>,
    pub category: Option<CourseCategory>,
    pub video_url: Option<String>,
    pub owner: Option<UserId>,
    pub is_paid: bool,
    /// Major currency units; absent for free courses.
    pub price: Option<Decimal>,
    pub created_at: Timestamp,
}

impl From<&Course> for CourseView {
    fn from(course: &Course) -> Self {
        Self {
            id: course.id,
            name: course.name.clone(),
            description: course.description.clone(),
            category: course.category,
            video_url: course.video_url.clone(),
            owner: course.owner,
            is_paid: course.is_paid(),
            price: course.price().map(|p| p.amount()),
            created_at: course.created_at,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CourseListItem {
    #[serde(flatten)]
    pub course: CourseView,
    pub lesson_count: u32,
}

impl From<CourseSummary> for CourseListItem {
    fn from(summary: CourseSummary) -> Self {
        Self {
            course: CourseView::from(&summary.course),
            lesson_count: summary.lesson_count,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LessonListItem {
    pub id: LessonId,
    pub name: String,
    pub position: u32,
}

impl From<&Lesson> for LessonListItem {
    fn from(lesson: &Lesson) -> Self {
        Self {
            id: lesson.id,
            name: lesson.name.clone(),
            position: lesson.position,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CourseDetailResponse {
    #[serde(flatten)]
    pub course: CourseView,
    pub lessons: Vec<LessonListItem>,
    pub has_access_to_lessons: bool,
    pub can_edit: bool,
}

impl From<CourseDetail> for CourseDetailResponse {
    fn from(detail: CourseDetail) -> Self {
        Self {
            course: CourseView::from(&detail.course),
            lessons: detail.lessons.iter().map(LessonListItem::from).collect(),
            has_access_to_lessons: detail.has_access_to_lessons,
            can_edit: detail.can_edit,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LessonResponse {
    pub id: LessonId,
    pub course_id: CourseId,
    pub name: String,
    pub description: Option<String>,
    pub video_url: Option<String>,
    pub owner: Option<UserId>,
    pub position: u32,
    pub created_at: Timestamp,
    pub can_edit: bool,
}

impl LessonResponse {
    /// Response for a lesson the caller just created or edited.
    pub fn authored(lesson: Lesson) -> Self {
        Self::from(LessonDetail {
            lesson,
            can_edit: true,
        })
    }
}

impl From<LessonDetail> for LessonResponse {
    fn from(detail: LessonDetail) -> Self {
        let lesson = detail.lesson;
        Self {
            id: lesson.id,
            course_id: lesson.course_id,
            name: lesson.name,
            description: lesson.description,
            video_url: lesson.video_url,
            owner: lesson.owner,
            position: lesson.position,
            created_at: lesson.created_at,
            can_edit: detail.can_edit,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StartCourseResponse {
    /// `started` or `already_started`.
    pub status: String,
}

impl From<StartCourseResult> for StartCourseResponse {
    fn from(result: StartCourseResult) -> Self {
        Self {
            status: result.as_str().to_string(),
        }
    }
}
