//! Outcome of an access check.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Result of asking whether a principal may do something.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "decision", content = "reason", rename_all = "snake_case")]
pub enum AccessDecision {
    Granted,
    Denied(DenialReason),
}

impl AccessDecision {
    pub fn is_granted(&self) -> bool {
        matches!(self, AccessDecision::Granted)
    }

    pub fn is_denied(&self) -> bool {
        !self.is_granted()
    }

    /// Returns the denial reason, if denied.
    pub fn reason(&self) -> Option<DenialReason> {
        match self {
            AccessDecision::Granted => None,
            AccessDecision::Denied(reason) => Some(*reason),
        }
    }

    /// Converts to a `Result` so callers can use `?` at the boundary.
    pub fn into_result(self) -> Result<(), DenialReason> {
        match self {
            AccessDecision::Granted => Ok(()),
            AccessDecision::Denied(reason) => Err(reason),
        }
    }
}

/// Why access was refused.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DenialReason {
    /// No user is signed in.
    NotAuthenticated,
    /// The lesson belongs to a paid course the user has not bought.
    NotPurchased,
    /// The user is signed in but is neither owner nor superuser.
    InsufficientPrivilege,
}

impl DenialReason {
    pub fn user_message(&self) -> &'static str {
        match self {
            DenialReason::NotAuthenticated => "Authentication is required to view this content",
            DenialReason::NotPurchased => {
                "This course has not been purchased. Buy the course to get full access to its lessons"
            }
            DenialReason::InsufficientPrivilege => {
                "You do not have permission to modify this content"
            }
        }
    }

    pub fn code(&self) -> &'static str {
        match self {
            DenialReason::NotAuthenticated => "not_authenticated",
            DenialReason::NotPurchased => "not_purchased",
            DenialReason::InsufficientPrivilege => "insufficient_privilege",
        }
    }
}

impl fmt::Display for DenialReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.user_message())
    }
}
