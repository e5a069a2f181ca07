//! Payment aggregate.

use serde::{Deserialize, Serialize};

use crate::domain::catalog::{Course, Price};
use crate::domain::foundation::{
    CourseId, PaymentId, StateMachine, Timestamp, UserId, ValidationError,
};

use super::{GatewayIntent, PaymentError, PaymentMethod, PaymentStatus};

/// What a payment buys. Only whole courses are sold.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(tag = "kind", content = "id", rename_all = "snake_case")]
pub enum PaymentTarget {
    Course(CourseId),
}

impl PaymentTarget {
    pub fn course_id(&self) -> CourseId {
        match self {
            PaymentTarget::Course(id) => *id,
        }
    }
}

/// One attempt by a user to buy a course.
///
/// The amount is copied from the course when the purchase starts and never
/// changes afterwards, even if the course is repriced.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Payment {
    pub id: PaymentId,
    pub user_id: UserId,
    pub target: PaymentTarget,
    pub amount: Price,
    pub method: PaymentMethod,
    pub status: PaymentStatus,
    pub intent: GatewayIntent,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}

impl Payment {
    /// Opens a pending payment for `course`.
    ///
    /// Free courses cannot be bought.
    pub fn start(
        user_id: UserId,
        course: &Course,
        method: PaymentMethod,
    ) -> Result<Self, PaymentError> {
        let amount = course.price().copied().ok_or_else(|| {
            PaymentError::invalid_request("This course is free and cannot be purchased")
        })?;

        let now = Timestamp::now();
        Ok(Self {
            id: PaymentId::new(),
            user_id,
            target: PaymentTarget::Course(course.id),
            amount,
            method,
            status: PaymentStatus::Pending,
            intent: GatewayIntent::Draft,
            created_at: now,
            updated_at: now,
        })
    }

    pub fn course_id(&self) -> CourseId {
        self.target.course_id()
    }

    pub fn is_pending(&self) -> bool {
        self.status == PaymentStatus::Pending
    }

    pub fn session_id(&self) -> Option<&str> {
        self.intent.session_id()
    }

    pub fn record_product(&mut self, product_id: impl Into<String>) -> Result<(), ValidationError> {
        self.intent = self.intent.with_product(product_id)?;
        self.touch();
        Ok(())
    }

    pub fn record_price(&mut self, price_id: impl Into<String>) -> Result<(), ValidationError> {
        self.intent = self.intent.with_price(price_id)?;
        self.touch();
        Ok(())
    }

    pub fn record_session(
        &mut self,
        session_id: impl Into<String>,
        session_url: impl Into<String>,
    ) -> Result<(), ValidationError> {
        self.intent = self.intent.with_session(session_id, session_url)?;
        self.touch();
        Ok(())
    }

    pub fn mark_succeeded(&mut self) -> Result<(), ValidationError> {
        self.status = self.status.transition_to(PaymentStatus::Succeeded)?;
        self.touch();
        Ok(())
    }

    pub fn mark_failed(&mut self) -> Result<(), ValidationError> {
        self.status = self.status.transition_to(PaymentStatus::Failed)?;
        self.touch();
        Ok(())
    }

    fn touch(&mut self) {
        self.updated_at = Timestamp::now();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::catalog::CoursePricing;
    use rust_decimal_macros::dec;

    fn paid_course() -> Course {
        let price = Price::new(dec!(500)).unwrap();
        Course::new("Rust", None, CoursePricing::Paid(price)).unwrap()
    }

    #[test]
    fn start_copies_course_price() {
        let course = paid_course();
        let payment = Payment::start(UserId::new(), &course, PaymentMethod::default()).unwrap();

        assert_eq!(payment.amount.amount(), dec!(500));
        assert_eq!(payment.course_id(), course.id);
        assert_eq!(payment.status, PaymentStatus::Pending);
        assert_eq!(payment.method, PaymentMethod::Transfer);
        assert_eq!(payment.intent, GatewayIntent::Draft);
    }

    #[test]
    fn start_rejects_free_course() {
        let course = Course::new("Intro", None, CoursePricing::Free).unwrap();
        let result = Payment::start(UserId::new(), &course, PaymentMethod::Transfer);
        assert!(matches!(
            result,
            Err(PaymentError::InvalidPurchaseRequest { .. })
        ));
    }

    #[test]
    fn records_gateway_ids_in_order() {
        let mut payment =
            Payment::start(UserId::new(), &paid_course(), PaymentMethod::Transfer).unwrap();
        payment.record_product("prod_1").unwrap();
        payment.record_price("price_1").unwrap();
        payment.record_session("sess_1", "https://pay/sess_1").unwrap();

        assert_eq!(payment.session_id(), Some("sess_1"));
        assert!(payment.record_price("price_2").is_err());
    }

    #[test]
    fn settled_payment_cannot_change() {
        let mut payment =
            Payment::start(UserId::new(), &paid_course(), PaymentMethod::Transfer).unwrap();
        payment.mark_succeeded().unwrap();

        assert!(payment.mark_failed().is_err());
        assert!(payment.mark_succeeded().is_err());
        assert_eq!(payment.status, PaymentStatus::Succeeded);
    }
}
