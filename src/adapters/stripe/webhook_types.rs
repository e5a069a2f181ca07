//! Stripe-specific wire types.
//!
//! These types represent Stripe API objects as they arrive in API responses
//! and webhook payloads. Only the fields this crate reads are declared;
//! serde ignores the rest.

use serde::{Deserialize, Serialize};

use crate::domain::payment::ExternalPaymentStatus;

// ════════════════════════════════════════════════════════════════════════════════
// Signature Parsing
// ════════════════════════════════════════════════════════════════════════════════

/// Error parsing the Stripe-Signature header.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SignatureParseError {
    /// Header is empty or missing.
    MissingHeader,
    /// Missing timestamp component (t=...).
    MissingTimestamp,
    /// Missing v1 signature component.
    MissingV1Signature,
    InvalidTimestamp,
    /// A v1 value is not valid hex.
    InvalidSignatureFormat,
}

impl std::fmt::Display for SignatureParseError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::MissingHeader => write!(f, "Missing Stripe-Signature header"),
            Self::MissingTimestamp => write!(f, "Missing timestamp (t=) in signature"),
            Self::MissingV1Signature => write!(f, "Missing v1 signature in header"),
            Self::InvalidTimestamp => write!(f, "Invalid timestamp format"),
            Self::InvalidSignatureFormat => write!(f, "Invalid signature format (not valid hex)"),
        }
    }
}

impl std::error::Error for SignatureParseError {}

/// Parsed Stripe-Signature header components.
///
/// The header format is `t=timestamp,v1=signature[,v1=signature...]`.
/// Stripe sends several `v1` entries while a signing secret is being
/// rolled; any one of them may match.
#[derive(Debug, Clone)]
pub struct SignatureHeader {
    /// Unix timestamp when Stripe signed the payload.
    pub timestamp: i64,

    /// All v1 signatures (HMAC-SHA256), decoded from hex.
    pub v1_signatures: Vec<Vec<u8>>,
}

impl SignatureHeader {
    pub fn parse(header: &str) -> Result<Self, SignatureParseError> {
        if header.trim().is_empty() {
            return Err(SignatureParseError::MissingHeader);
        }

        let mut timestamp: Option<i64> = None;
        let mut v1_signatures = Vec::new();

        for part in header.split(',') {
            let Some((key, value)) = part.split_once('=') else {
                continue;
            };

            match key.trim() {
                "t" => {
                    timestamp = Some(
                        value
                            .trim()
                            .parse()
                            .map_err(|_| SignatureParseError::InvalidTimestamp)?,
                    );
                }
                "v1" => {
                    let bytes = hex::decode(value.trim())
                        .map_err(|_| SignatureParseError::InvalidSignatureFormat)?;
                    v1_signatures.push(bytes);
                }
                // v0 and unknown schemes are ignored
                _ => {}
            }
        }

        let timestamp = timestamp.ok_or(SignatureParseError::MissingTimestamp)?;
        if v1_signatures.is_empty() {
            return Err(SignatureParseError::MissingV1Signature);
        }

        Ok(Self {
            timestamp,
            v1_signatures,
        })
    }
}

// ════════════════════════════════════════════════════════════════════════════════
// Stripe Event Types
// ════════════════════════════════════════════════════════════════════════════════

/// Raw Stripe webhook event envelope.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct StripeWebhookEvent {
    /// Unique event identifier (evt_...).
    pub id: String,

    /// Event type (e.g., "checkout.session.completed").
    #[serde(rename = "type")]
    pub event_type: String,

    pub created: i64,

    pub data: StripeEventData,

    /// Whether this is a live or test event.
    #[serde(default)]
    pub livemode: bool,
}

/// Event data container.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct StripeEventData {
    /// The object affected by this event.
    pub object: serde_json::Value,
}

// ════════════════════════════════════════════════════════════════════════════════
// Stripe Object Types
// ════════════════════════════════════════════════════════════════════════════════

/// Stripe Checkout Session object.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct StripeCheckoutSession {
    /// Unique session identifier (cs_...).
    pub id: String,

    /// `paid`, `unpaid` or `no_payment_required`.
    pub payment_status: String,

    /// `open`, `complete` or `expired`.
    #[serde(default)]
    pub status: Option<String>,

    /// Hosted checkout page. Absent once the session is complete.
    #[serde(default)]
    pub url: Option<String>,

    #[serde(default)]
    pub mode: Option<String>,
}

impl StripeCheckoutSession {
    /// Normalized status as seen through a live session retrieval.
    pub fn external_status(&self) -> ExternalPaymentStatus {
        match (self.payment_status.as_str(), self.status.as_deref()) {
            ("paid", _) => ExternalPaymentStatus::Paid,
            (_, Some("expired")) => ExternalPaymentStatus::Failed,
            _ => ExternalPaymentStatus::Unpaid,
        }
    }
}

/// Stripe Product object.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct StripeProduct {
    /// Unique product identifier (prod_...).
    pub id: String,

    pub name: String,
}

/// Stripe Price object.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct StripePrice {
    /// Unique price identifier (price_...).
    pub id: String,

    /// Amount in the currency's minor unit.
    pub unit_amount: Option<i64>,

    pub currency: String,
}

/// Error body returned by the Stripe API on non-2xx responses.
#[derive(Debug, Clone, Deserialize)]
pub struct StripeErrorEnvelope {
    pub error: StripeApiError,
}

#[derive(Debug, Clone, Deserialize)]
pub struct StripeApiError {
    #[serde(rename = "type")]
    pub error_type: String,

    #[serde(default)]
    pub code: Option<String>,

    #[serde(default)]
    pub message: Option<String>,
}
