//! In-Memory Store Adapter
//!
//! Implements every repository port over one mutex-guarded state so that
//! settle-and-grant is atomic exactly as the Postgres transaction is.
//! Useful for tests and local development.

use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use tokio::sync::Mutex;

use crate::domain::catalog::{Course, Lesson};
use crate::domain::foundation::{
    CourseId, DomainError, ErrorCode, LessonId, PaymentId, UserId,
};
use crate::domain::payment::{Payment, PaymentStatus};
use crate::domain::user::User;
use crate::ports::{
    CatalogReader, CatalogRepository, CourseSummary, PaymentFilter, PaymentOrder,
    PaymentRepository, TransitionOutcome, UserRepository,
};

#[derive(Debug, Default)]
struct State {
    users: HashMap<UserId, User>,
    courses: HashMap<CourseId, Course>,
    lessons: HashMap<LessonId, Lesson>,
    payments: HashMap<PaymentId, Payment>,
    grants_applied: usize,
}

/// In-memory storage for users, catalog and payments.
#[derive(Debug, Clone, Default)]
pub struct InMemoryStore {
    state: Arc<Mutex<State>>,
    fail_grants: Arc<AtomicBool>,
}

impl InMemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn insert_user(&self, user: User) {
        self.state.lock().await.users.insert(user.id, user);
    }

    pub async fn insert_course(&self, course: Course) {
        self.state.lock().await.courses.insert(course.id, course);
    }

    pub async fn insert_lesson(&self, lesson: Lesson) {
        self.state.lock().await.lessons.insert(lesson.id, lesson);
    }

    /// Number of settle-and-grant calls that actually changed state.
    pub async fn grant_count(&self) -> usize {
        self.state.lock().await.grants_applied
    }

    pub async fn payment_count(&self) -> usize {
        self.state.lock().await.payments.len()
    }

    /// Make `complete_and_grant` fail as if the database were down.
    pub fn fail_grants(&self, fail: bool) {
        self.fail_grants.store(fail, Ordering::SeqCst);
    }
}

fn payment_not_found(id: &PaymentId) -> DomainError {
    DomainError::new(ErrorCode::PaymentNotFound, format!("Payment not found: {}", id))
}

fn conflict(message: impl Into<String>) -> DomainError {
    DomainError::new(ErrorCode::Conflict, message)
}

fn course_not_found(id: &CourseId) -> DomainError {
    DomainError::new(ErrorCode::CourseNotFound, format!("Course not found: {}", id))
}

fn lesson_not_found(id: &LessonId) -> DomainError {
    DomainError::new(ErrorCode::LessonNotFound, format!("Lesson not found: {}", id))
}

fn user_not_found(id: &UserId) -> DomainError {
    DomainError::new(ErrorCode::UserNotFound, format!("User not found: {}", id))
}

impl State {
    /// First unique account field of `user` already held by another account.
    fn taken_field(&self, user: &User) -> Option<&'static str> {
        let others = || self.users.values().filter(|u| u.id != user.id);
        if others().any(|u| u.username == user.username) {
            Some("username")
        } else if others().any(|u| u.email == user.email) {
            Some("email")
        } else if others().any(|u| u.phone_number == user.phone_number) {
            Some("phone_number")
        } else {
            None
        }
    }
}

#[async_trait]
impl CatalogReader for InMemoryStore {
    async fn find_course(&self, id: &CourseId) -> Result<Option<Course>, DomainError> {
        Ok(self.state.lock().await.courses.get(id).cloned())
    }

    async fn find_lesson(&self, id: &LessonId) -> Result<Option<Lesson>, DomainError> {
        Ok(self.state.lock().await.lessons.get(id).cloned())
    }

    async fn list_courses(&self) -> Result<Vec<CourseSummary>, DomainError> {
        let state = self.state.lock().await;
        let mut summaries: Vec<CourseSummary> = state
            .courses
            .values()
            .map(|course| CourseSummary {
                lesson_count: state
                    .lessons
                    .values()
                    .filter(|l| l.belongs_to(&course.id))
                    .count() as u32,
                course: course.clone(),
            })
            .collect();
        summaries.sort_by(|a, b| b.course.created_at.cmp(&a.course.created_at));
        Ok(summaries)
    }

    async fn list_lessons(&self, course_id: &CourseId) -> Result<Vec<Lesson>, DomainError> {
        let state = self.state.lock().await;
        let mut lessons: Vec<Lesson> = state
            .lessons
            .values()
            .filter(|l| l.belongs_to(course_id))
            .cloned()
            .collect();
        lessons.sort_by_key(|l| (l.position, l.created_at));
        Ok(lessons)
    }
}

#[async_trait]
impl UserRepository for InMemoryStore {
    async fn find_by_id(&self, id: &UserId) -> Result<Option<User>, DomainError> {
        Ok(self.state.lock().await.users.get(id).cloned())
    }

    async fn find_by_phone(&self, phone_number: &str) -> Result<Option<User>, DomainError> {
        let state = self.state.lock().await;
        Ok(state
            .users
            .values()
            .find(|u| u.phone_number == phone_number)
            .cloned())
    }

    async fn save(&self, user: &User) -> Result<(), DomainError> {
        let mut state = self.state.lock().await;
        if state.users.contains_key(&user.id) {
            return Err(conflict("User already exists"));
        }
        if let Some(field) = state.taken_field(user) {
            return Err(conflict(format!("{} already in use", field)).with_detail("field", field));
        }
        state.users.insert(user.id, user.clone());
        Ok(())
    }

    async fn update(&self, user: &User) -> Result<(), DomainError> {
        let mut state = self.state.lock().await;
        if let Some(field) = state.taken_field(user) {
            return Err(conflict(format!("{} already in use", field)).with_detail("field", field));
        }
        let stored = state
            .users
            .get_mut(&user.id)
            .ok_or_else(|| user_not_found(&user.id))?;
        stored.username = user.username.clone();
        stored.email = user.email.clone();
        stored.phone_number = user.phone_number.clone();
        stored.password_hash = user.password_hash.clone();
        Ok(())
    }

    async fn add_started_course(
        &self,
        user_id: &UserId,
        course_id: &CourseId,
    ) -> Result<bool, DomainError> {
        let mut state = self.state.lock().await;
        let user = state
            .users
            .get_mut(user_id)
            .ok_or_else(|| user_not_found(user_id))?;
        Ok(user.started_courses.insert(*course_id))
    }
}

#[async_trait]
impl CatalogRepository for InMemoryStore {
    async fn save_course(&self, course: &Course) -> Result<(), DomainError> {
        let mut state = self.state.lock().await;
        if state.courses.contains_key(&course.id) {
            return Err(conflict("Course already exists"));
        }
        state.courses.insert(course.id, course.clone());
        Ok(())
    }

    async fn update_course(&self, course: &Course) -> Result<(), DomainError> {
        let mut state = self.state.lock().await;
        let stored = state
            .courses
            .get_mut(&course.id)
            .ok_or_else(|| course_not_found(&course.id))?;
        *stored = course.clone();
        Ok(())
    }

    async fn delete_course(&self, id: &CourseId) -> Result<(), DomainError> {
        let mut state = self.state.lock().await;
        if !state.courses.contains_key(id) {
            return Err(course_not_found(id));
        }
        if state.payments.values().any(|p| p.course_id() == *id) {
            return Err(conflict("Course has payments and cannot be deleted"));
        }
        state.courses.remove(id);
        state.lessons.retain(|_, lesson| !lesson.belongs_to(id));
        for user in state.users.values_mut() {
            user.bought_courses.remove(id);
            user.started_courses.remove(id);
        }
        Ok(())
    }

    async fn save_lesson(&self, lesson: &Lesson) -> Result<(), DomainError> {
        let mut state = self.state.lock().await;
        if !state.courses.contains_key(&lesson.course_id) {
            return Err(course_not_found(&lesson.course_id));
        }
        if state.lessons.contains_key(&lesson.id) {
            return Err(conflict("Lesson already exists"));
        }
        state.lessons.insert(lesson.id, lesson.clone());
        Ok(())
    }

    async fn update_lesson(&self, lesson: &Lesson) -> Result<(), DomainError> {
        let mut state = self.state.lock().await;
        let stored = state
            .lessons
            .get_mut(&lesson.id)
            .ok_or_else(|| lesson_not_found(&lesson.id))?;
        *stored = lesson.clone();
        Ok(())
    }

    async fn delete_lesson(&self, id: &LessonId) -> Result<(), DomainError> {
        let mut state = self.state.lock().await;
        state
            .lessons
            .remove(id)
            .map(|_| ())
            .ok_or_else(|| lesson_not_found(id))
    }
}

#[async_trait]
impl PaymentRepository for InMemoryStore {
    async fn save(&self, payment: &Payment) -> Result<(), DomainError> {
        let mut state = self.state.lock().await;
        if state.payments.contains_key(&payment.id) {
            return Err(conflict("Payment already exists"));
        }
        state.payments.insert(payment.id, payment.clone());
        Ok(())
    }

    async fn update_intent(&self, payment: &Payment) -> Result<(), DomainError> {
        let mut state = self.state.lock().await;
        if let Some(session_id) = payment.session_id() {
            let clash = state
                .payments
                .values()
                .any(|p| p.id != payment.id && p.session_id() == Some(session_id));
            if clash {
                return Err(conflict("Checkout session already linked to another payment"));
            }
        }
        let stored = state
            .payments
            .get_mut(&payment.id)
            .ok_or_else(|| payment_not_found(&payment.id))?;
        stored.intent = payment.intent.clone();
        stored.updated_at = payment.updated_at;
        Ok(())
    }

    async fn find_by_id(&self, id: &PaymentId) -> Result<Option<Payment>, DomainError> {
        Ok(self.state.lock().await.payments.get(id).cloned())
    }

    async fn find_by_session_id(&self, session_id: &str) -> Result<Option<Payment>, DomainError> {
        let state = self.state.lock().await;
        Ok(state
            .payments
            .values()
            .find(|p| p.session_id() == Some(session_id))
            .cloned())
    }

    async fn complete_and_grant(&self, id: &PaymentId) -> Result<TransitionOutcome, DomainError> {
        let mut state = self.state.lock().await;

        let payment = state.payments.get(id).ok_or_else(|| payment_not_found(id))?;
        match payment.status {
            PaymentStatus::Succeeded => return Ok(TransitionOutcome::AlreadySucceeded),
            PaymentStatus::Failed => return Ok(TransitionOutcome::AlreadyFailed),
            PaymentStatus::Pending => {}
        }
        let (user_id, course_id) = (payment.user_id, payment.course_id());

        if self.fail_grants.load(Ordering::SeqCst) {
            return Err(DomainError::database("simulated grant failure"));
        }
        if !state.users.contains_key(&user_id) {
            return Err(DomainError::database(format!(
                "payment {} references missing user {}",
                id, user_id
            )));
        }

        // Both writes happen under the same lock; nothing above has mutated.
        if let Some(payment) = state.payments.get_mut(id) {
            payment
                .mark_succeeded()
                .map_err(|e| DomainError::database(e.to_string()))?;
        }
        if let Some(user) = state.users.get_mut(&user_id) {
            user.bought_courses.insert(course_id);
        }
        state.grants_applied += 1;

        Ok(TransitionOutcome::Applied)
    }

    async fn mark_failed(&self, id: &PaymentId) -> Result<TransitionOutcome, DomainError> {
        let mut state = self.state.lock().await;
        let payment = state.payments.get_mut(id).ok_or_else(|| payment_not_found(id))?;
        match payment.status {
            PaymentStatus::Succeeded => Ok(TransitionOutcome::AlreadySucceeded),
            PaymentStatus::Failed => Ok(TransitionOutcome::AlreadyFailed),
            PaymentStatus::Pending => {
                payment
                    .mark_failed()
                    .map_err(|e| DomainError::database(e.to_string()))?;
                Ok(TransitionOutcome::Applied)
            }
        }
    }

    async fn list(&self, filter: &PaymentFilter) -> Result<Vec<Payment>, DomainError> {
        let state = self.state.lock().await;
        let mut payments: Vec<Payment> = state
            .payments
            .values()
            .filter(|p| filter.matches(p))
            .cloned()
            .collect();
        payments.sort_by_key(|p| (p.created_at, *p.id.as_uuid()));
        if filter.order == PaymentOrder::CreatedAtDesc {
            payments.reverse();
        }
        Ok(payments)
    }
}
