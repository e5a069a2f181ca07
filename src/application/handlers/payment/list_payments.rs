//! ListPaymentsHandler - Query handler for payment history.

use std::sync::Arc;

use crate::domain::access::DenialReason;
use crate::domain::foundation::CourseId;
use crate::domain::payment::{Payment, PaymentError, PaymentMethod};
use crate::domain::user::Principal;
use crate::ports::{PaymentFilter, PaymentOrder, PaymentRepository};

#[derive(Debug, Clone)]
pub struct ListPaymentsQuery {
    pub principal: Principal,
    pub course_id: Option<CourseId>,
    pub method: Option<PaymentMethod>,
    pub order: PaymentOrder,
}

/// Lists the caller's own payments. Superusers see everyone's.
pub struct ListPaymentsHandler {
    payments: Arc<dyn PaymentRepository>,
}

impl ListPaymentsHandler {
    pub fn new(payments: Arc<dyn PaymentRepository>) -> Self {
        Self { payments }
    }

    pub async fn handle(&self, query: ListPaymentsQuery) -> Result<Vec<Payment>, PaymentError> {
        let user = query
            .principal
            .user()
            .ok_or(PaymentError::access_denied(DenialReason::NotAuthenticated))?;

        let filter = PaymentFilter {
            user_id: (!user.is_superuser).then_some(user.id),
            course_id: query.course_id,
            method: query.method,
            order: query.order,
        };

        Ok(self.payments.list(&filter).await?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::adapters::memory::InMemoryStore;
    use crate::application::handlers::payment::fixtures::{buyer, paid_course};
    use crate::domain::user::User;

    async fn seed(store: &InMemoryStore, user: &User, method: PaymentMethod) -> Payment {
        let course = paid_course();
        store.insert_course(course.clone()).await;
        let payment = Payment::start(user.id, &course, method).unwrap();
        store.save(&payment).await.unwrap();
        payment
    }

    fn query(principal: Principal) -> ListPaymentsQuery {
        ListPaymentsQuery {
            principal,
            course_id: None,
            method: None,
            order: PaymentOrder::default(),
        }
    }

    #[tokio::test]
    async fn member_sees_only_own_payments() {
        let store = InMemoryStore::new();
        let alice = buyer();
        let bob = User::new("bob", "bob@example.com", "+15550004444").unwrap();
        let own = seed(&store, &alice, PaymentMethod::Transfer).await;
        seed(&store, &bob, PaymentMethod::Transfer).await;
        let handler = ListPaymentsHandler::new(Arc::new(store));

        let payments = handler
            .handle(query(Principal::Authenticated(alice)))
            .await
            .unwrap();

        assert_eq!(payments.len(), 1);
        assert_eq!(payments[0].id, own.id);
    }

    #[tokio::test]
    async fn superuser_sees_all_payments() {
        let store = InMemoryStore::new();
        let alice = buyer();
        let bob = User::new("bob", "bob@example.com", "+15550004444").unwrap();
        seed(&store, &alice, PaymentMethod::Transfer).await;
        seed(&store, &bob, PaymentMethod::Cash).await;
        let handler = ListPaymentsHandler::new(Arc::new(store));

        let admin = User::new("admin", "admin@example.com", "+15550005555")
            .unwrap()
            .as_superuser();
        let payments = handler
            .handle(query(Principal::Authenticated(admin)))
            .await
            .unwrap();

        assert_eq!(payments.len(), 2);
    }

    #[tokio::test]
    async fn filters_by_method_and_course() {
        let store = InMemoryStore::new();
        let alice = buyer();
        let cash = seed(&store, &alice, PaymentMethod::Cash).await;
        let transfer = seed(&store, &alice, PaymentMethod::Transfer).await;
        let handler = ListPaymentsHandler::new(Arc::new(store));

        let mut by_method = query(Principal::Authenticated(alice.clone()));
        by_method.method = Some(PaymentMethod::Cash);
        let payments = handler.handle(by_method).await.unwrap();
        assert_eq!(payments.len(), 1);
        assert_eq!(payments[0].id, cash.id);

        let mut by_course = query(Principal::Authenticated(alice));
        by_course.course_id = Some(transfer.course_id());
        let payments = handler.handle(by_course).await.unwrap();
        assert_eq!(payments.len(), 1);
        assert_eq!(payments[0].id, transfer.id);
    }

    #[tokio::test]
    async fn anonymous_is_not_authenticated() {
        let handler = ListPaymentsHandler::new(Arc::new(InMemoryStore::new()));
        let err = handler.handle(query(Principal::Anonymous)).await.unwrap_err();
        assert_eq!(err, PaymentError::AccessDenied(DenialReason::NotAuthenticated));
    }
}
