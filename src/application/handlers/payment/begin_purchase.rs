//! BeginPurchaseHandler - Command handler for starting a course purchase.
//!
//! Creates a pending payment, then registers product, price and checkout
//! session with the processor. Each processor id is persisted as soon as it
//! is obtained. When a processor call fails the pending row is kept with
//! whatever ids it already has, and the caller learns which step failed.

use std::sync::Arc;

use tracing::{info, warn};

use crate::domain::access::DenialReason;
use crate::domain::foundation::{CourseId, PaymentId};
use crate::domain::payment::{GatewayStep, Payment, PaymentError, PaymentMethod};
use crate::domain::user::Principal;
use crate::ports::{
    CatalogReader, CreateCheckoutSessionRequest, GatewayError, PaymentGateway, PaymentRepository,
};

/// Builds the browser return addresses for a payment.
///
/// Both embed the payment id so the return handlers can find the record
/// without any session state.
#[derive(Debug, Clone)]
pub struct CheckoutUrls {
    public_base_url: String,
}

impl CheckoutUrls {
    pub fn new(public_base_url: impl Into<String>) -> Self {
        Self {
            public_base_url: public_base_url.into().trim_end_matches('/').to_string(),
        }
    }

    pub fn success_url(&self, payment_id: &PaymentId) -> String {
        format!("{}/payments/{}/success", self.public_base_url, payment_id)
    }

    pub fn cancel_url(&self, payment_id: &PaymentId) -> String {
        format!("{}/payments/{}/cancel", self.public_base_url, payment_id)
    }
}

#[derive(Debug, Clone)]
pub struct BeginPurchaseCommand {
    pub principal: Principal,
    pub course_id: CourseId,
    /// Defaults to `transfer`.
    pub method: Option<PaymentMethod>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BeginPurchaseResult {
    pub payment_id: PaymentId,
    /// Processor checkout page the buyer is sent to.
    pub redirect_url: String,
}

pub struct BeginPurchaseHandler {
    catalog: Arc<dyn CatalogReader>,
    payments: Arc<dyn PaymentRepository>,
    gateway: Arc<dyn PaymentGateway>,
    urls: CheckoutUrls,
}

impl BeginPurchaseHandler {
    pub fn new(
        catalog: Arc<dyn CatalogReader>,
        payments: Arc<dyn PaymentRepository>,
        gateway: Arc<dyn PaymentGateway>,
        urls: CheckoutUrls,
    ) -> Self {
        Self {
            catalog,
            payments,
            gateway,
            urls,
        }
    }

    pub async fn handle(
        &self,
        cmd: BeginPurchaseCommand,
    ) -> Result<BeginPurchaseResult, PaymentError> {
        // 1. Buyer must be signed in
        let user = cmd
            .principal
            .user()
            .ok_or(PaymentError::access_denied(DenialReason::NotAuthenticated))?;

        // 2. Load course and build the pending payment (rejects free courses)
        let course = self
            .catalog
            .find_course(&cmd.course_id)
            .await?
            .ok_or_else(|| PaymentError::course_not_found(cmd.course_id))?;

        let mut payment = Payment::start(user.id, &course, cmd.method.unwrap_or_default())?;

        if user.has_bought(&course.id) {
            return Err(PaymentError::invalid_request("Course already purchased"));
        }

        // 3. Persist before any processor call so the attempt is on record
        self.payments.save(&payment).await?;
        info!(
            payment_id = %payment.id,
            user_id = %payment.user_id,
            course_id = %course.id,
            amount = %payment.amount,
            "payment created"
        );

        // 4. Product
        let product = self
            .gateway
            .create_product(&format!("Course {}", course.name))
            .await
            .map_err(|e| gateway_failure(&payment, GatewayStep::CreateProduct, e))?;
        payment.record_product(product.id)?;
        self.payments.update_intent(&payment).await?;

        // 5. Price, in minor units
        let product_id = payment.intent.product_id().unwrap_or_default().to_string();
        let price = self
            .gateway
            .create_price(&product_id, payment.amount.to_minor_units())
            .await
            .map_err(|e| gateway_failure(&payment, GatewayStep::CreatePrice, e))?;
        payment.record_price(price.id)?;
        self.payments.update_intent(&payment).await?;

        // 6. Checkout session
        let price_id = payment.intent.price_id().unwrap_or_default().to_string();
        let session = self
            .gateway
            .create_checkout_session(CreateCheckoutSessionRequest {
                price_id,
                success_url: self.urls.success_url(&payment.id),
                cancel_url: self.urls.cancel_url(&payment.id),
            })
            .await
            .map_err(|e| gateway_failure(&payment, GatewayStep::CreateCheckoutSession, e))?;
        payment.record_session(session.id, session.url.clone())?;
        self.payments.update_intent(&payment).await?;

        info!(
            payment_id = %payment.id,
            session_id = payment.session_id().unwrap_or_default(),
            "checkout session linked"
        );

        Ok(BeginPurchaseResult {
            payment_id: payment.id,
            redirect_url: session.url,
        })
    }
}

fn gateway_failure(payment: &Payment, step: GatewayStep, err: GatewayError) -> PaymentError {
    warn!(
        payment_id = %payment.id,
        step = %step,
        stage = payment.intent.stage(),
        error = %err,
        "payment processor call failed, payment left pending"
    );
    PaymentError::gateway(step, err.message, err.retryable)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::adapters::memory::InMemoryStore;
    use crate::adapters::stripe::MockPaymentGateway;
    use crate::application::handlers::payment::fixtures::{buyer, free_course, paid_course};
    use crate::domain::payment::{GatewayIntent, PaymentStatus};
    use crate::domain::user::User;
    use crate::domain::catalog::Course;

    struct Harness {
        store: InMemoryStore,
        gateway: MockPaymentGateway,
        handler: BeginPurchaseHandler,
    }

    fn harness() -> Harness {
        let store = InMemoryStore::new();
        let gateway = MockPaymentGateway::new();
        let handler = BeginPurchaseHandler::new(
            Arc::new(store.clone()),
            Arc::new(store.clone()),
            Arc::new(gateway.clone()),
            CheckoutUrls::new("https://paperskill.example/"),
        );
        Harness {
            store,
            gateway,
            handler,
        }
    }

    fn command(user: &User, course: &Course) -> BeginPurchaseCommand {
        BeginPurchaseCommand {
            principal: Principal::Authenticated(user.clone()),
            course_id: course.id,
            method: None,
        }
    }

    #[test]
    fn checkout_urls_embed_payment_id() {
        let urls = CheckoutUrls::new("https://paperskill.example/");
        let id = PaymentId::new();
        assert_eq!(
            urls.success_url(&id),
            format!("https://paperskill.example/payments/{}/success", id)
        );
        assert_eq!(
            urls.cancel_url(&id),
            format!("https://paperskill.example/payments/{}/cancel", id)
        );
    }

    #[tokio::test]
    async fn creates_pending_payment_and_returns_redirect() {
        let h = harness();
        let course = paid_course();
        let user = buyer();
        h.store.insert_course(course.clone()).await;

        let result = h.handler.handle(command(&user, &course)).await.unwrap();

        assert_eq!(result.redirect_url, "https://checkout.example/sess_1");
        let payment = h.store.find_by_id(&result.payment_id).await.unwrap().unwrap();
        assert_eq!(payment.status, PaymentStatus::Pending);
        assert_eq!(payment.user_id, user.id);
        assert_eq!(payment.course_id(), course.id);
        assert_eq!(payment.method, PaymentMethod::Transfer);
        assert_eq!(
            payment.intent,
            GatewayIntent::Linked {
                product_id: "prod_1".to_string(),
                price_id: "price_1".to_string(),
                session_id: "sess_1".to_string(),
                session_url: "https://checkout.example/sess_1".to_string(),
            }
        );
    }

    #[tokio::test]
    async fn sends_minor_units_and_course_name_to_processor() {
        let h = harness();
        let course = paid_course();
        h.store.insert_course(course.clone()).await;

        let result = h.handler.handle(command(&buyer(), &course)).await.unwrap();

        let calls = h.gateway.calls();
        assert_eq!(calls[0].method, "create_product");
        assert_eq!(calls[0].args, vec![format!("Course {}", course.name)]);
        assert_eq!(calls[1].method, "create_price");
        assert_eq!(calls[1].args, vec!["prod_1".to_string(), "50000".to_string()]);
        assert_eq!(calls[2].method, "create_checkout_session");
        assert!(calls[2].args.contains(&format!(
            "https://paperskill.example/payments/{}/success",
            result.payment_id
        )));
    }

    #[tokio::test]
    async fn free_course_is_rejected_without_row() {
        let h = harness();
        let course = free_course();
        h.store.insert_course(course.clone()).await;

        let result = h.handler.handle(command(&buyer(), &course)).await;

        assert!(matches!(
            result,
            Err(PaymentError::InvalidPurchaseRequest { .. })
        ));
        assert_eq!(h.store.payment_count().await, 0);
        assert!(h.gateway.calls().is_empty());
    }

    #[tokio::test]
    async fn already_bought_course_is_rejected_without_row() {
        let h = harness();
        let course = paid_course();
        let mut user = buyer();
        user.bought_courses.insert(course.id);
        h.store.insert_course(course.clone()).await;

        let result = h.handler.handle(command(&user, &course)).await;

        assert!(matches!(
            result,
            Err(PaymentError::InvalidPurchaseRequest { .. })
        ));
        assert_eq!(h.store.payment_count().await, 0);
    }

    #[tokio::test]
    async fn anonymous_is_not_authenticated() {
        let h = harness();
        let course = paid_course();
        h.store.insert_course(course.clone()).await;

        let result = h
            .handler
            .handle(BeginPurchaseCommand {
                principal: Principal::Anonymous,
                course_id: course.id,
                method: None,
            })
            .await;

        assert_eq!(
            result.unwrap_err(),
            PaymentError::AccessDenied(DenialReason::NotAuthenticated)
        );
    }

    #[tokio::test]
    async fn unknown_course_is_not_found() {
        let h = harness();
        let id = CourseId::new();

        let result = h
            .handler
            .handle(BeginPurchaseCommand {
                principal: Principal::Authenticated(buyer()),
                course_id: id,
                method: None,
            })
            .await;

        assert_eq!(result.unwrap_err(), PaymentError::CourseNotFound(id));
    }

    #[tokio::test]
    async fn price_failure_keeps_pending_row_with_product() {
        let h = harness();
        let course = paid_course();
        h.store.insert_course(course.clone()).await;
        h.gateway
            .fail_on("create_price", GatewayError::network("connection reset"));

        let result = h.handler.handle(command(&buyer(), &course)).await;

        match result {
            Err(PaymentError::Gateway {
                step, retryable, ..
            }) => {
                assert_eq!(step, GatewayStep::CreatePrice);
                assert!(retryable);
            }
            other => panic!("expected gateway error, got {:?}", other),
        }

        let payments = h
            .store
            .list(&crate::ports::PaymentFilter::default())
            .await
            .unwrap();
        assert_eq!(payments.len(), 1);
        assert_eq!(payments[0].status, PaymentStatus::Pending);
        assert_eq!(
            payments[0].intent,
            GatewayIntent::ProductCreated {
                product_id: "prod_1".to_string()
            }
        );
    }

    #[tokio::test]
    async fn session_failure_reports_step() {
        let h = harness();
        let course = paid_course();
        h.store.insert_course(course.clone()).await;
        h.gateway.fail_on(
            "create_checkout_session",
            GatewayError::processor("session rejected"),
        );

        let err = h.handler.handle(command(&buyer(), &course)).await.unwrap_err();

        assert!(matches!(
            err,
            PaymentError::Gateway {
                step: GatewayStep::CreateCheckoutSession,
                ..
            }
        ));
        assert_eq!(err.message(), "Payment could not be started, try again");
        assert_eq!(h.store.payment_count().await, 1);
    }

    #[tokio::test]
    async fn explicit_cash_method_is_recorded() {
        let h = harness();
        let course = paid_course();
        h.store.insert_course(course.clone()).await;
        let mut cmd = command(&buyer(), &course);
        cmd.method = Some(PaymentMethod::Cash);

        let result = h.handler.handle(cmd).await.unwrap();

        let payment = h.store.find_by_id(&result.payment_id).await.unwrap().unwrap();
        assert_eq!(payment.method, PaymentMethod::Cash);
    }
}
