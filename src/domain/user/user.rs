//! User account entity.

use std::collections::HashSet;

use serde::{Deserialize, Serialize};

use crate::domain::foundation::{CourseId, Timestamp, UserId, ValidationError};

use super::PasswordHash;

const MIN_PHONE_DIGITS: usize = 7;
const MAX_PHONE_DIGITS: usize = 15;

/// A registered user together with their course grants.
///
/// `bought_courses` is the durable, payment-backed grant. `started_courses`
/// only records that the user enrolled; it never unlocks paid content.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct User {
    pub id: UserId,
    pub username: String,
    pub email: String,
    pub phone_number: String,
    pub is_superuser: bool,
    pub is_active: bool,
    pub bought_courses: HashSet<CourseId>,
    pub started_courses: HashSet<CourseId>,
    /// Absent for accounts that sign in through another issuer.
    #[serde(skip)]
    pub password_hash: Option<PasswordHash>,
    pub created_at: Timestamp,
}

/// Profile edits. `None` leaves the field as it is.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct UserChanges {
    pub username: Option<String>,
    pub email: Option<String>,
    pub phone_number: Option<String>,
}

impl User {
    pub fn new(
        username: impl Into<String>,
        email: &str,
        phone_number: &str,
    ) -> Result<Self, ValidationError> {
        Ok(Self {
            id: UserId::new(),
            username: checked_username(username.into())?,
            email: normalize_email(email)?,
            phone_number: normalize_phone(phone_number)?,
            is_superuser: false,
            is_active: true,
            bought_courses: HashSet::new(),
            started_courses: HashSet::new(),
            password_hash: None,
            created_at: Timestamp::now(),
        })
    }

    pub fn with_password_hash(mut self, hash: PasswordHash) -> Self {
        self.password_hash = Some(hash);
        self
    }

    /// Applies profile edits, normalising contact fields. Nothing is
    /// modified if any edit is invalid.
    pub fn apply(&mut self, changes: UserChanges) -> Result<(), ValidationError> {
        let username = changes.username.map(checked_username).transpose()?;
        let email = changes.email.as_deref().map(normalize_email).transpose()?;
        let phone_number = changes
            .phone_number
            .as_deref()
            .map(normalize_phone)
            .transpose()?;

        if let Some(username) = username {
            self.username = username;
        }
        if let Some(email) = email {
            self.email = email;
        }
        if let Some(phone_number) = phone_number {
            self.phone_number = phone_number;
        }
        Ok(())
    }

    pub fn with_id(mut self, id: UserId) -> Self {
        self.id = id;
        self
    }

    pub fn as_superuser(mut self) -> Self {
        self.is_superuser = true;
        self
    }

    pub fn has_bought(&self, course_id: &CourseId) -> bool {
        self.bought_courses.contains(course_id)
    }

    pub fn has_started(&self, course_id: &CourseId) -> bool {
        self.started_courses.contains(course_id)
    }
}

fn checked_username(username: String) -> Result<String, ValidationError> {
    let username = username.trim().to_string();
    if username.is_empty() {
        return Err(ValidationError::empty_field("username"));
    }
    Ok(username)
}

/// Lower-cases and checks the address has a local part and a dotted domain.
pub fn normalize_email(raw: &str) -> Result<String, ValidationError> {
    let email = raw.trim().to_lowercase();
    if email.is_empty() {
        return Err(ValidationError::empty_field("email"));
    }

    match email.split_once('@') {
        Some((local, domain))
            if !local.is_empty() && domain.contains('.') && !domain.contains('@') =>
        {
            Ok(email)
        }
        _ => Err(ValidationError::invalid_format(
            "email",
            "expected local@domain",
        )),
    }
}

/// Strips separators and checks for `+` followed by 7 to 15 digits.
pub fn normalize_phone(raw: &str) -> Result<String, ValidationError> {
    let compact: String = raw
        .chars()
        .filter(|c| !matches!(c, ' ' | '-' | '(' | ')'))
        .collect();
    if compact.is_empty() {
        return Err(ValidationError::empty_field("phone_number"));
    }

    let digits = compact.strip_prefix('+').ok_or_else(|| {
        ValidationError::invalid_format("phone_number", "must start with a country code (+)")
    })?;

    if !digits.chars().all(|c| c.is_ascii_digit())
        || !(MIN_PHONE_DIGITS..=MAX_PHONE_DIGITS).contains(&digits.len())
    {
        return Err(ValidationError::invalid_format(
            "phone_number",
            "expected 7 to 15 digits",
        ));
    }

    Ok(compact)
}
