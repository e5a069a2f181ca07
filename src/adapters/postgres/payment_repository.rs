//! PostgreSQL implementation of PaymentRepository.
//!
//! Settlement runs in one transaction: the payment row is locked, moved from
//! `pending` with a conditional update, and the course grant is inserted
//! before commit. A concurrent caller blocks on the row lock and then sees
//! the settled status.

use crate::domain::catalog::Price;
use crate::domain::foundation::{
    CourseId, DomainError, ErrorCode, PaymentId, Timestamp, UserId,
};
use crate::domain::payment::{
    GatewayIntent, Payment, PaymentMethod, PaymentStatus, PaymentTarget,
};
use crate::ports::{PaymentFilter, PaymentOrder, PaymentRepository, TransitionOutcome};
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use sqlx::{PgPool, Postgres, QueryBuilder};
use uuid::Uuid;

const PAYMENT_COLUMNS: &str = "id, user_id, course_id, amount, method, status, \
     product_id, price_id, external_session_id, session_url, created_at, updated_at";

/// PostgreSQL implementation of the PaymentRepository port.
pub struct PostgresPaymentRepository {
    pool: PgPool,
}

impl PostgresPaymentRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

/// Database row representation of a payment.
#[derive(Debug, sqlx::FromRow)]
struct PaymentRow {
    id: Uuid,
    user_id: Uuid,
    course_id: Uuid,
    amount: Decimal,
    method: String,
    status: String,
    product_id: Option<String>,
    price_id: Option<String>,
    external_session_id: Option<String>,
    session_url: Option<String>,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl TryFrom<PaymentRow> for Payment {
    type Error = DomainError;

    fn try_from(row: PaymentRow) -> Result<Self, Self::Error> {
        let corrupt = |what: &str, e: &dyn std::fmt::Display| {
            DomainError::new(
                ErrorCode::DatabaseError,
                format!("Invalid {} on payment {}: {}", what, row.id, e),
            )
        };

        let amount = Price::new(row.amount).map_err(|e| corrupt("amount", &e))?;
        let method: PaymentMethod = row.method.parse().map_err(|e| corrupt("method", &e))?;
        let status: PaymentStatus = row.status.parse().map_err(|e| corrupt("status", &e))?;
        let intent = GatewayIntent::from_columns(
            row.product_id.clone(),
            row.price_id.clone(),
            row.external_session_id.clone(),
            row.session_url.clone(),
        )
        .map_err(|e| corrupt("gateway ids", &e))?;

        Ok(Payment {
            id: PaymentId::from_uuid(row.id),
            user_id: UserId::from_uuid(row.user_id),
            target: PaymentTarget::Course(CourseId::from_uuid(row.course_id)),
            amount,
            method,
            status,
            intent,
            created_at: Timestamp::from_datetime(row.created_at),
            updated_at: Timestamp::from_datetime(row.updated_at),
        })
    }
}

fn db_error(context: &str, err: sqlx::Error) -> DomainError {
    if let sqlx::Error::Database(db_err) = &err {
        if db_err.code().as_deref() == Some("23505") {
            return DomainError::new(ErrorCode::Conflict, format!("{}: duplicate key", context));
        }
    }
    DomainError::new(ErrorCode::DatabaseError, format!("{}: {}", context, err))
}

fn not_found(id: &PaymentId) -> DomainError {
    DomainError::new(ErrorCode::PaymentNotFound, format!("Payment not found: {}", id))
}

fn outcome_for_settled(status: PaymentStatus) -> Option<TransitionOutcome> {
    match status {
        PaymentStatus::Pending => None,
        PaymentStatus::Succeeded => Some(TransitionOutcome::AlreadySucceeded),
        PaymentStatus::Failed => Some(TransitionOutcome::AlreadyFailed),
    }
}

fn parse_status(raw: &str) -> Result<PaymentStatus, DomainError> {
    raw.parse().map_err(|e| {
        DomainError::new(ErrorCode::DatabaseError, format!("Invalid status value: {}", e))
    })
}

#[async_trait]
impl PaymentRepository for PostgresPaymentRepository {
    async fn save(&self, payment: &Payment) -> Result<(), DomainError> {
        sqlx::query(
            r#"
            INSERT INTO payments (
                id, user_id, course_id, amount, method, status,
                product_id, price_id, external_session_id, session_url,
                created_at, updated_at
            ) VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12)
            "#,
        )
        .bind(payment.id.as_uuid())
        .bind(payment.user_id.as_uuid())
        .bind(payment.course_id().as_uuid())
        .bind(payment.amount.amount())
        .bind(payment.method.as_str())
        .bind(payment.status.as_str())
        .bind(payment.intent.product_id())
        .bind(payment.intent.price_id())
        .bind(payment.intent.session_id())
        .bind(payment.intent.session_url())
        .bind(payment.created_at.as_datetime())
        .bind(payment.updated_at.as_datetime())
        .execute(&self.pool)
        .await
        .map_err(|e| db_error("Failed to save payment", e))?;

        Ok(())
    }

    async fn update_intent(&self, payment: &Payment) -> Result<(), DomainError> {
        let result = sqlx::query(
            r#"
            UPDATE payments SET
                product_id = $2,
                price_id = $3,
                external_session_id = $4,
                session_url = $5,
                updated_at = $6
            WHERE id = $1
            "#,
        )
        .bind(payment.id.as_uuid())
        .bind(payment.intent.product_id())
        .bind(payment.intent.price_id())
        .bind(payment.intent.session_id())
        .bind(payment.intent.session_url())
        .bind(payment.updated_at.as_datetime())
        .execute(&self.pool)
        .await
        .map_err(|e| db_error("Failed to update payment intent", e))?;

        if result.rows_affected() == 0 {
            return Err(not_found(&payment.id));
        }
        Ok(())
    }

    async fn find_by_id(&self, id: &PaymentId) -> Result<Option<Payment>, DomainError> {
        let row: Option<PaymentRow> = sqlx::query_as(&format!(
            "SELECT {} FROM payments WHERE id = $1",
            PAYMENT_COLUMNS
        ))
        .bind(id.as_uuid())
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| db_error("Failed to load payment", e))?;

        row.map(Payment::try_from).transpose()
    }

    async fn find_by_session_id(&self, session_id: &str) -> Result<Option<Payment>, DomainError> {
        let row: Option<PaymentRow> = sqlx::query_as(&format!(
            "SELECT {} FROM payments WHERE external_session_id = $1",
            PAYMENT_COLUMNS
        ))
        .bind(session_id)
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| db_error("Failed to load payment by session", e))?;

        row.map(Payment::try_from).transpose()
    }

    async fn complete_and_grant(&self, id: &PaymentId) -> Result<TransitionOutcome, DomainError> {
        let mut tx = self
            .pool
            .begin()
            .await
            .map_err(|e| db_error("Failed to begin transaction", e))?;

        let locked: Option<(Uuid, Uuid, String)> = sqlx::query_as(
            "SELECT user_id, course_id, status FROM payments WHERE id = $1 FOR UPDATE",
        )
        .bind(id.as_uuid())
        .fetch_optional(&mut *tx)
        .await
        .map_err(|e| db_error("Failed to lock payment", e))?;

        let (user_id, course_id, status) = locked.ok_or_else(|| not_found(id))?;
        if let Some(outcome) = outcome_for_settled(parse_status(&status)?) {
            // Dropping the transaction rolls back and releases the lock.
            return Ok(outcome);
        }

        let updated = sqlx::query(
            r#"
            UPDATE payments SET status = 'succeeded', updated_at = NOW()
            WHERE id = $1 AND status = 'pending'
            "#,
        )
        .bind(id.as_uuid())
        .execute(&mut *tx)
        .await
        .map_err(|e| db_error("Failed to mark payment succeeded", e))?;

        if updated.rows_affected() != 1 {
            return Err(DomainError::new(
                ErrorCode::ReconciliationConflict,
                format!("Payment {} changed while locked", id),
            ));
        }

        sqlx::query(
            r#"
            INSERT INTO user_bought_courses (user_id, course_id, granted_at)
            VALUES ($1, $2, NOW())
            ON CONFLICT (user_id, course_id) DO NOTHING
            "#,
        )
        .bind(user_id)
        .bind(course_id)
        .execute(&mut *tx)
        .await
        .map_err(|e| db_error("Failed to grant course", e))?;

        tx.commit()
            .await
            .map_err(|e| db_error("Failed to commit settlement", e))?;

        Ok(TransitionOutcome::Applied)
    }

    async fn mark_failed(&self, id: &PaymentId) -> Result<TransitionOutcome, DomainError> {
        let updated = sqlx::query(
            r#"
            UPDATE payments SET status = 'failed', updated_at = NOW()
            WHERE id = $1 AND status = 'pending'
            "#,
        )
        .bind(id.as_uuid())
        .execute(&self.pool)
        .await
        .map_err(|e| db_error("Failed to mark payment failed", e))?;

        if updated.rows_affected() == 1 {
            return Ok(TransitionOutcome::Applied);
        }

        let status: Option<String> = sqlx::query_scalar("SELECT status FROM payments WHERE id = $1")
            .bind(id.as_uuid())
            .fetch_optional(&self.pool)
            .await
            .map_err(|e| db_error("Failed to load payment status", e))?;

        let status = parse_status(&status.ok_or_else(|| not_found(id))?)?;
        outcome_for_settled(status).ok_or_else(|| {
            DomainError::new(
                ErrorCode::ReconciliationConflict,
                format!("Payment {} is pending but could not be updated", id),
            )
        })
    }

    async fn list(&self, filter: &PaymentFilter) -> Result<Vec<Payment>, DomainError> {
        let mut query: QueryBuilder<Postgres> =
            QueryBuilder::new(format!("SELECT {} FROM payments WHERE TRUE", PAYMENT_COLUMNS));

        if let Some(user_id) = &filter.user_id {
            query.push(" AND user_id = ").push_bind(*user_id.as_uuid());
        }
        if let Some(course_id) = &filter.course_id {
            query.push(" AND course_id = ").push_bind(*course_id.as_uuid());
        }
        if let Some(method) = &filter.method {
            query.push(" AND method = ").push_bind(method.as_str());
        }
        query.push(match filter.order {
            PaymentOrder::CreatedAtAsc => " ORDER BY created_at ASC, id ASC",
            PaymentOrder::CreatedAtDesc => " ORDER BY created_at DESC, id DESC",
        });

        let rows: Vec<PaymentRow> = query
            .build_query_as()
            .fetch_all(&self.pool)
            .await
            .map_err(|e| db_error("Failed to list payments", e))?;

        rows.into_iter().map(Payment::try_from).collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    fn row() -> PaymentRow {
        PaymentRow {
            id: Uuid::new_v4(),
            user_id: Uuid::new_v4(),
            course_id: Uuid::new_v4(),
            amount: dec!(500.00),
            method: "transfer".to_string(),
            status: "pending".to_string(),
            product_id: Some("prod_1".to_string()),
            price_id: Some("price_1".to_string()),
            external_session_id: Some("sess_1".to_string()),
            session_url: Some("https://checkout.example/sess_1".to_string()),
            created_at: Utc::now(),
            updated_at: Utc::now(),
        }
    }

    #[test]
    fn row_converts_to_linked_payment() {
        let payment = Payment::try_from(row()).unwrap();
        assert_eq!(payment.status, PaymentStatus::Pending);
        assert_eq!(payment.method, PaymentMethod::Transfer);
        assert_eq!(payment.session_id(), Some("sess_1"));
        assert_eq!(payment.amount.to_minor_units(), 50_000);
    }

    #[test]
    fn row_with_gap_in_gateway_ids_is_rejected() {
        let mut bad = row();
        bad.price_id = None;
        let err = Payment::try_from(bad).unwrap_err();
        assert_eq!(err.code, ErrorCode::DatabaseError);
    }

    #[test]
    fn row_with_unknown_status_is_rejected() {
        let mut bad = row();
        bad.status = "refunded".to_string();
        assert!(Payment::try_from(bad).is_err());
    }

    #[test]
    fn row_with_zero_amount_is_rejected() {
        let mut bad = row();
        bad.amount = dec!(0);
        assert!(Payment::try_from(bad).is_err());
    }

    #[test]
    fn settled_statuses_short_circuit() {
        assert_eq!(outcome_for_settled(PaymentStatus::Pending), None);
        assert_eq!(
            outcome_for_settled(PaymentStatus::Succeeded),
            Some(TransitionOutcome::AlreadySucceeded)
        );
        assert_eq!(
            outcome_for_settled(PaymentStatus::Failed),
            Some(TransitionOutcome::AlreadyFailed)
        );
    }
}
