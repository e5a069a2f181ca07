//! Payment status state machine.

use crate::domain::foundation::{StateMachine, ValidationError};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Lifecycle of a payment record.
///
/// ```text
/// pending ──► succeeded
///    │
///    └──────► failed
/// ```
///
/// Both outcomes are terminal.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PaymentStatus {
    /// Created when the purchase starts; awaiting confirmation.
    Pending,

    /// Processor confirmed the money; course granted.
    Succeeded,

    /// Processor reported a definitive failure (session expired, async payment failed).
    Failed,
}

impl PaymentStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            PaymentStatus::Pending => "pending",
            PaymentStatus::Succeeded => "succeeded",
            PaymentStatus::Failed => "failed",
        }
    }
}

impl StateMachine for PaymentStatus {
    fn can_transition_to(&self, target: &Self) -> bool {
        use PaymentStatus::*;
        matches!((self, target), (Pending, Succeeded) | (Pending, Failed))
    }

    fn valid_transitions(&self) -> Vec<Self> {
        use PaymentStatus::*;
        match self {
            Pending => vec![Succeeded, Failed],
            Succeeded | Failed => vec![],
        }
    }
}

impl fmt::Display for PaymentStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for PaymentStatus {
    type Err = ValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "pending" => Ok(PaymentStatus::Pending),
            "succeeded" => Ok(PaymentStatus::Succeeded),
            "failed" => Ok(PaymentStatus::Failed),
            other => Err(ValidationError::invalid_format(
                "status",
                format!("unknown payment status '{}'", other),
            )),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn pending_can_transition_to_succeeded() {
        assert!(PaymentStatus::Pending.can_transition_to(&PaymentStatus::Succeeded));
    }

    #[test]
    fn pending_can_transition_to_failed() {
        assert!(PaymentStatus::Pending.can_transition_to(&PaymentStatus::Failed));
    }

    #[test]
    fn succeeded_is_terminal() {
        assert!(PaymentStatus::Succeeded.is_terminal());
        assert!(PaymentStatus::Succeeded
            .transition_to(PaymentStatus::Failed)
            .is_err());
        assert!(PaymentStatus::Succeeded
            .transition_to(PaymentStatus::Pending)
            .is_err());
    }

    #[test]
    fn failed_is_terminal() {
        assert!(PaymentStatus::Failed.is_terminal());
        assert!(PaymentStatus::Failed
            .transition_to(PaymentStatus::Succeeded)
            .is_err());
    }

    #[test]
    fn pending_cannot_stay_pending() {
        assert!(!PaymentStatus::Pending.can_transition_to(&PaymentStatus::Pending));
    }

    #[test]
    fn parses_storage_representation() {
        for status in [
            PaymentStatus::Pending,
            PaymentStatus::Succeeded,
            PaymentStatus::Failed,
        ] {
            assert_eq!(status.as_str().parse::<PaymentStatus>(), Ok(status));
        }
        assert!("refunded".parse::<PaymentStatus>().is_err());
    }
}
