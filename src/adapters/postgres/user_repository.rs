//! PostgreSQL implementation of UserRepository.
//!
//! Bought and started courses live in join tables; the user aggregate is
//! assembled from three queries. Writes here never touch those tables.

use std::collections::HashSet;

use crate::domain::foundation::{CourseId, DomainError, ErrorCode, Timestamp, UserId};
use crate::domain::user::{PasswordHash, User};
use crate::ports::UserRepository;
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::PgPool;
use uuid::Uuid;

/// PostgreSQL implementation of the UserRepository port.
pub struct PostgresUserRepository {
    pool: PgPool,
}

impl PostgresUserRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Attach grants to a loaded row.
    async fn assemble(&self, row: Option<UserRow>) -> Result<Option<User>, DomainError> {
        let Some(row) = row else {
            return Ok(None);
        };

        let bought = self
            .course_ids(
                "SELECT course_id FROM user_bought_courses WHERE user_id = $1",
                row.id,
            )
            .await?;
        let started = self
            .course_ids(
                "SELECT course_id FROM user_started_courses WHERE user_id = $1",
                row.id,
            )
            .await?;

        Ok(Some(row.into_user(bought, started)))
    }

    async fn course_ids(
        &self,
        query: &str,
        user_id: Uuid,
    ) -> Result<HashSet<CourseId>, DomainError> {
        let ids: Vec<Uuid> = sqlx::query_scalar(query)
            .bind(user_id)
            .fetch_all(&self.pool)
            .await
            .map_err(|e| DomainError::database(format!("Failed to load user courses: {}", e)))?;
        Ok(ids.into_iter().map(CourseId::from_uuid).collect())
    }
}

#[derive(Debug, sqlx::FromRow)]
struct UserRow {
    id: Uuid,
    username: String,
    email: String,
    phone_number: String,
    is_superuser: bool,
    is_active: bool,
    password_hash: Option<String>,
    created_at: DateTime<Utc>,
}

const USER_COLUMNS: &str =
    "id, username, email, phone_number, is_superuser, is_active, password_hash, created_at";

impl UserRow {
    fn into_user(self, bought: HashSet<CourseId>, started: HashSet<CourseId>) -> User {
        User {
            id: UserId::from_uuid(self.id),
            username: self.username,
            email: self.email,
            phone_number: self.phone_number,
            is_superuser: self.is_superuser,
            is_active: self.is_active,
            bought_courses: bought,
            started_courses: started,
            password_hash: self.password_hash.map(PasswordHash::new),
            created_at: Timestamp::from_datetime(self.created_at),
        }
    }
}

/// Maps a unique violation to the field that caused it.
fn conflict_field(constraint: Option<&str>) -> &'static str {
    match constraint {
        Some("users_username_key") => "username",
        Some("users_email_key") => "email",
        Some("users_phone_number_key") => "phone_number",
        _ => "id",
    }
}

fn write_error(action: &str, e: sqlx::Error) -> DomainError {
    if let sqlx::Error::Database(db_err) = &e {
        if db_err.code().as_deref() == Some("23505") {
            let field = conflict_field(db_err.constraint());
            return DomainError::new(ErrorCode::Conflict, format!("{} already in use", field))
                .with_detail("field", field);
        }
    }
    DomainError::database(format!("Failed to {}: {}", action, e))
}

#[async_trait]
impl UserRepository for PostgresUserRepository {
    async fn find_by_id(&self, id: &UserId) -> Result<Option<User>, DomainError> {
        let row: Option<UserRow> =
            sqlx::query_as(&format!("SELECT {} FROM users WHERE id = $1", USER_COLUMNS))
                .bind(id.as_uuid())
                .fetch_optional(&self.pool)
                .await
                .map_err(|e| DomainError::database(format!("Failed to load user: {}", e)))?;

        self.assemble(row).await
    }

    async fn find_by_phone(&self, phone_number: &str) -> Result<Option<User>, DomainError> {
        let row: Option<UserRow> = sqlx::query_as(&format!(
            "SELECT {} FROM users WHERE phone_number = $1",
            USER_COLUMNS
        ))
        .bind(phone_number)
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| DomainError::database(format!("Failed to load user: {}", e)))?;

        self.assemble(row).await
    }

    async fn save(&self, user: &User) -> Result<(), DomainError> {
        sqlx::query(
            r#"
            INSERT INTO users (
                id, username, email, phone_number, is_superuser, is_active,
                password_hash, created_at
            )
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8)
            "#,
        )
        .bind(user.id.as_uuid())
        .bind(&user.username)
        .bind(&user.email)
        .bind(&user.phone_number)
        .bind(user.is_superuser)
        .bind(user.is_active)
        .bind(user.password_hash.as_ref().map(PasswordHash::as_str))
        .bind(user.created_at.as_datetime())
        .execute(&self.pool)
        .await
        .map_err(|e| write_error("save user", e))?;

        Ok(())
    }

    async fn update(&self, user: &User) -> Result<(), DomainError> {
        let result = sqlx::query(
            r#"
            UPDATE users
            SET username = $2, email = $3, phone_number = $4, password_hash = $5
            WHERE id = $1
            "#,
        )
        .bind(user.id.as_uuid())
        .bind(&user.username)
        .bind(&user.email)
        .bind(&user.phone_number)
        .bind(user.password_hash.as_ref().map(PasswordHash::as_str))
        .execute(&self.pool)
        .await
        .map_err(|e| write_error("update user", e))?;

        if result.rows_affected() == 0 {
            return Err(DomainError::new(
                ErrorCode::UserNotFound,
                format!("User not found: {}", user.id),
            ));
        }
        Ok(())
    }

    async fn add_started_course(
        &self,
        user_id: &UserId,
        course_id: &CourseId,
    ) -> Result<bool, DomainError> {
        let result = sqlx::query(
            r#"
            INSERT INTO user_started_courses (user_id, course_id, started_at)
            VALUES ($1, $2, NOW())
            ON CONFLICT (user_id, course_id) DO NOTHING
            "#,
        )
        .bind(user_id.as_uuid())
        .bind(course_id.as_uuid())
        .execute(&self.pool)
        .await
        .map_err(|e| DomainError::database(format!("Failed to record started course: {}", e)))?;

        Ok(result.rows_affected() == 1)
    }
}
