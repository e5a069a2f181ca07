//! Payment repository port.
//!
//! Persists payment attempts and performs the one state change that must be
//! atomic: settling a payment as succeeded together with granting the course.
//!
//! # Design
//!
//! - **Single writer per settlement**: `complete_and_grant` is a compare-and-set
//!   on `status = pending`; concurrent callers observe exactly one `Applied`
//! - **Grant in the same transaction**: a succeeded payment without a grant
//!   (or a grant without a succeeded payment) is never observable
//! - **Intent persisted per step**: `update_intent` is called after every
//!   successful gateway call

use crate::domain::foundation::{CourseId, DomainError, PaymentId, UserId};
use crate::domain::payment::{Payment, PaymentMethod};
use async_trait::async_trait;

/// Repository port for Payment persistence.
#[async_trait]
pub trait PaymentRepository: Send + Sync {
    /// Insert a new pending payment.
    ///
    /// # Errors
    ///
    /// - `Conflict` if the id or session id already exists
    /// - `DatabaseError` on persistence failure
    async fn save(&self, payment: &Payment) -> Result<(), DomainError>;

    /// Store the gateway correlation identifiers of `payment`.
    ///
    /// # Errors
    ///
    /// - `PaymentNotFound` if the payment doesn't exist
    async fn update_intent(&self, payment: &Payment) -> Result<(), DomainError>;

    async fn find_by_id(&self, id: &PaymentId) -> Result<Option<Payment>, DomainError>;

    /// Find the payment linked to a checkout session.
    async fn find_by_session_id(&self, session_id: &str) -> Result<Option<Payment>, DomainError>;

    /// Atomically move a pending payment to succeeded and add its course to
    /// the buyer's bought courses.
    ///
    /// Returns `AlreadySucceeded` or `AlreadyFailed` without changing
    /// anything when the payment is no longer pending.
    ///
    /// # Errors
    ///
    /// - `PaymentNotFound` if the payment doesn't exist
    /// - `DatabaseError` on persistence failure (nothing is committed)
    async fn complete_and_grant(&self, id: &PaymentId) -> Result<TransitionOutcome, DomainError>;

    /// Move a pending payment to failed. Never touches grants.
    async fn mark_failed(&self, id: &PaymentId) -> Result<TransitionOutcome, DomainError>;

    /// List payments matching `filter`.
    async fn list(&self, filter: &PaymentFilter) -> Result<Vec<Payment>, DomainError>;
}

/// Result of a conditional status transition.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TransitionOutcome {
    /// This call performed the transition.
    Applied,

    /// The payment had already succeeded; nothing changed.
    AlreadySucceeded,

    /// The payment had already failed; nothing changed.
    AlreadyFailed,
}

/// Query parameters for listing payments.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PaymentFilter {
    /// Restrict to one buyer. `None` lists everyone's payments.
    pub user_id: Option<UserId>,
    pub course_id: Option<CourseId>,
    pub method: Option<PaymentMethod>,
    pub order: PaymentOrder,
}

impl PaymentFilter {
    pub fn for_user(user_id: UserId) -> Self {
        Self {
            user_id: Some(user_id),
            ..Self::default()
        }
    }

    /// Whether `payment` passes every criterion of this filter.
    pub fn matches(&self, payment: &Payment) -> bool {
        self.user_id.map_or(true, |id| payment.user_id == id)
            && self.course_id.map_or(true, |id| payment.course_id() == id)
            && self.method.map_or(true, |m| payment.method == m)
    }
}

/// Sort order on `created_at`.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum PaymentOrder {
    CreatedAtAsc,
    #[default]
    CreatedAtDesc,
}

impl PaymentOrder {
    /// Parses the `ordering` query value (`created_at` or `-created_at`).
    pub fn parse(raw: &str) -> Option<Self> {
        match raw {
            "created_at" => Some(PaymentOrder::CreatedAtAsc),
            "-created_at" => Some(PaymentOrder::CreatedAtDesc),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::catalog::{Course, CoursePricing, Price};
    use rust_decimal_macros::dec;

    #[test]
    fn payment_repository_is_object_safe() {
        fn _accepts_dyn(_repo: &dyn PaymentRepository) {}
    }

    #[test]
    fn ordering_parses_both_directions() {
        assert_eq!(PaymentOrder::parse("created_at"), Some(PaymentOrder::CreatedAtAsc));
        assert_eq!(PaymentOrder::parse("-created_at"), Some(PaymentOrder::CreatedAtDesc));
        assert_eq!(PaymentOrder::parse("amount"), None);
        assert_eq!(PaymentOrder::default(), PaymentOrder::CreatedAtDesc);
    }

    #[test]
    fn filter_matches_on_all_criteria() {
        let course = Course::new(
            "Rust",
            None,
            CoursePricing::Paid(Price::new(dec!(10)).unwrap()),
        )
        .unwrap();
        let buyer = UserId::new();
        let payment = Payment::start(buyer, &course, PaymentMethod::Transfer).unwrap();

        assert!(PaymentFilter::default().matches(&payment));
        assert!(PaymentFilter::for_user(buyer).matches(&payment));
        assert!(!PaymentFilter::for_user(UserId::new()).matches(&payment));

        let by_cash = PaymentFilter {
            method: Some(PaymentMethod::Cash),
            ..PaymentFilter::default()
        };
        assert!(!by_cash.matches(&payment));
    }
}
