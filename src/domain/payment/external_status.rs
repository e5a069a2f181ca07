//! Payment status as reported by the processor.

use serde::{Deserialize, Serialize};
use std::fmt;

use super::PaymentStatus;

/// Normalized processor view of a checkout session.
///
/// Only `Paid` and `Failed` are definitive. `Unpaid` covers every state in
/// which the buyer may still complete the checkout.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ExternalPaymentStatus {
    Paid,
    Unpaid,
    Failed,
}

impl ExternalPaymentStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            ExternalPaymentStatus::Paid => "paid",
            ExternalPaymentStatus::Unpaid => "unpaid",
            ExternalPaymentStatus::Failed => "failed",
        }
    }

    /// Local status this external report settles on, if any.
    pub fn settles_to(&self) -> Option<PaymentStatus> {
        match self {
            ExternalPaymentStatus::Paid => Some(PaymentStatus::Succeeded),
            ExternalPaymentStatus::Failed => Some(PaymentStatus::Failed),
            ExternalPaymentStatus::Unpaid => None,
        }
    }
}

impl fmt::Display for ExternalPaymentStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
