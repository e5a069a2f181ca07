//! Payment handlers.
//!
//! ## Commands
//! - Beginning a purchase (pending payment + processor checkout)
//! - Confirming a payment (the idempotent settle-and-grant core)
//! - Browser return from checkout (success and cancel)
//! - Processor webhooks
//!
//! ## Queries
//! - Payment history

mod begin_purchase;
mod checkout_return;
mod confirm_payment;
mod handle_payment_webhook;
mod list_payments;

// Commands
pub use begin_purchase::{
    BeginPurchaseCommand, BeginPurchaseHandler, BeginPurchaseResult, CheckoutUrls,
};
pub use checkout_return::{
    CheckoutCancelResult, CheckoutReturnResult, HandleCheckoutCancelCommand,
    HandleCheckoutCancelHandler, HandleCheckoutReturnCommand, HandleCheckoutReturnHandler,
};
pub use confirm_payment::{ConfirmPaymentCommand, ConfirmPaymentHandler, ReconcileResult};
pub use handle_payment_webhook::{
    HandlePaymentWebhookCommand, HandlePaymentWebhookHandler, HandlePaymentWebhookResult,
};

// Queries
pub use list_payments::{ListPaymentsHandler, ListPaymentsQuery};

#[cfg(test)]
pub(crate) mod fixtures {
    use crate::adapters::memory::InMemoryStore;
    use crate::domain::catalog::{Course, CoursePricing, Price};
    use crate::domain::payment::{Payment, PaymentMethod};
    use crate::domain::user::User;
    use crate::ports::PaymentRepository;
    use rust_decimal_macros::dec;

    pub fn paid_course() -> Course {
        let price = Price::new(dec!(500)).unwrap();
        Course::new("Rust for Engineers", None, CoursePricing::Paid(price)).unwrap()
    }

    pub fn free_course() -> Course {
        Course::new("Intro", None, CoursePricing::Free).unwrap()
    }

    pub fn buyer() -> User {
        User::new("alice", "alice@example.com", "+15550001234").unwrap()
    }

    pub struct Seeded {
        pub user: User,
        pub course: Course,
        pub payment: Payment,
    }

    /// A pending payment linked to checkout session `sess_1`.
    pub async fn seed_linked_payment(store: &InMemoryStore) -> Seeded {
        let user = buyer();
        let course = paid_course();
        store.insert_user(user.clone()).await;
        store.insert_course(course.clone()).await;

        let mut payment = Payment::start(user.id, &course, PaymentMethod::Transfer).unwrap();
        store.save(&payment).await.unwrap();
        payment.record_product("prod_1").unwrap();
        payment.record_price("price_1").unwrap();
        payment
            .record_session("sess_1", "https://checkout.example/sess_1")
            .unwrap();
        store.update_intent(&payment).await.unwrap();

        Seeded {
            user,
            course,
            payment,
        }
    }
}
