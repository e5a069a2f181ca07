//! Stripe webhook signature verification.
//!
//! Stripe signs `"{timestamp}.{raw body}"` with HMAC-SHA256 using the
//! endpoint's signing secret and sends the result in the Stripe-Signature
//! header. Verification runs against the raw bytes before any JSON parsing.

use hmac::{Hmac, Mac};
use secrecy::{ExposeSecret, SecretString};
use sha2::Sha256;
use subtle::ConstantTimeEq;

use crate::ports::GatewayError;

use super::webhook_types::SignatureHeader;

type HmacSha256 = Hmac<Sha256>;

/// Default maximum age for webhook events (5 minutes).
pub const DEFAULT_TOLERANCE_SECS: i64 = 300;

/// Clock skew tolerance for future timestamps (60 seconds).
const MAX_FUTURE_TOLERANCE_SECS: i64 = 60;

/// Checks Stripe-Signature headers against one signing secret.
#[derive(Clone)]
pub struct WebhookSignatureVerifier {
    secret: SecretString,
    tolerance_secs: i64,
}

impl WebhookSignatureVerifier {
    pub fn new(secret: SecretString) -> Self {
        Self {
            secret,
            tolerance_secs: DEFAULT_TOLERANCE_SECS,
        }
    }

    pub fn with_tolerance_secs(mut self, tolerance_secs: i64) -> Self {
        self.tolerance_secs = tolerance_secs;
        self
    }

    /// Verify `header` for `payload` at the current time.
    pub fn verify(&self, payload: &[u8], header: &str) -> Result<(), GatewayError> {
        self.verify_at(payload, header, chrono::Utc::now().timestamp())
    }

    /// Verify `header` for `payload` as if the current time were `now`.
    ///
    /// # Security
    ///
    /// - Uses constant-time comparison to prevent timing attacks
    /// - Validates timestamp to prevent replay attacks
    pub fn verify_at(&self, payload: &[u8], header: &str, now: i64) -> Result<(), GatewayError> {
        let header = SignatureHeader::parse(header).map_err(|e| {
            tracing::warn!(error = %e, "Failed to parse Stripe-Signature header");
            GatewayError::invalid_webhook(e.to_string())
        })?;

        let age = now.checked_sub(header.timestamp).ok_or_else(|| {
            tracing::warn!(
                event_timestamp = header.timestamp,
                "Webhook timestamp out of range"
            );
            GatewayError::invalid_webhook("Event timestamp out of range")
        })?;
        if age > self.tolerance_secs {
            tracing::warn!(
                event_timestamp = header.timestamp,
                current_time = now,
                age_secs = age,
                "Webhook event too old - possible replay attack"
            );
            return Err(GatewayError::invalid_webhook(format!(
                "Event too old ({} seconds)",
                age
            )));
        }
        if age < -MAX_FUTURE_TOLERANCE_SECS {
            tracing::warn!(
                event_timestamp = header.timestamp,
                current_time = now,
                "Webhook event from future - clock skew or manipulation"
            );
            return Err(GatewayError::invalid_webhook("Event timestamp in future"));
        }

        let expected = sign(self.secret.expose_secret(), header.timestamp, payload)?;
        let matched = header
            .v1_signatures
            .iter()
            .any(|candidate| expected.as_slice().ct_eq(candidate.as_slice()).into());

        if !matched {
            tracing::warn!("Invalid webhook signature");
            return Err(GatewayError::invalid_webhook("Invalid signature"));
        }

        Ok(())
    }
}

fn sign(secret: &str, timestamp: i64, payload: &[u8]) -> Result<Vec<u8>, GatewayError> {
    let mut mac = HmacSha256::new_from_slice(secret.as_bytes())
        .map_err(|e| GatewayError::invalid_webhook(format!("Unusable signing secret: {}", e)))?;
    mac.update(timestamp.to_string().as_bytes());
    mac.update(b".");
    mac.update(payload);
    Ok(mac.finalize().into_bytes().to_vec())
}

/// Builds a Stripe-Signature header value for `payload`.
///
/// Used by tests and local tooling that replay webhooks.
pub fn compute_signature_header(secret: &str, timestamp: i64, payload: &[u8]) -> String {
    let signature = sign(secret, timestamp, payload)
        .map(hex::encode)
        .unwrap_or_default();
    format!("t={},v1={}", timestamp, signature)
}

#[cfg(test)]
mod tests {
    use super::*;

    const SECRET: &str = "whsec_test_secret";
    const NOW: i64 = 1_704_067_200;
    const BODY: &[u8] = br#"{"id":"evt_1"}"#;

    fn verifier() -> WebhookSignatureVerifier {
        WebhookSignatureVerifier::new(SecretString::new(SECRET.to_string()))
    }

    #[test]
    fn verify_signature_valid() {
        let header = compute_signature_header(SECRET, NOW, BODY);
        assert!(verifier().verify_at(BODY, &header, NOW).is_ok());
    }

    #[test]
    fn verify_signature_extreme_timestamps_are_rejected() {
        for timestamp in [i64::MIN, i64::MAX] {
            let header = format!("t={},v1=00", timestamp);
            let err = verifier().verify_at(b"{}", &header, NOW).unwrap_err();
            assert!(err.is_invalid_webhook());
        }
    }

    #[test]
    fn verify_signature_negative_now_with_max_timestamp() {
        let header = format!("t={},v1=00", i64::MAX);
        let err = verifier().verify_at(b"{}", &header, -2).unwrap_err();
        assert!(err.is_invalid_webhook());
    }

    #[test]
    fn verify_signature_wrong_secret() {
        let header = compute_signature_header("whsec_other", NOW, BODY);
        let err = verifier().verify_at(BODY, &header, NOW).unwrap_err();
        assert!(err.is_invalid_webhook());
    }

    #[test]
    fn verify_signature_tampered_body() {
        let header = compute_signature_header(SECRET, NOW, BODY);
        assert!(verifier()
            .verify_at(br#"{"id":"evt_2"}"#, &header, NOW)
            .is_err());
    }

    #[test]
    fn verify_signature_expired_timestamp() {
        let header = compute_signature_header(SECRET, NOW - 301, BODY);
        assert!(verifier().verify_at(BODY, &header, NOW).is_err());
    }

    #[test]
    fn verify_signature_at_tolerance_edge() {
        let header = compute_signature_header(SECRET, NOW - 300, BODY);
        assert!(verifier().verify_at(BODY, &header, NOW).is_ok());
    }

    #[test]
    fn verify_signature_custom_tolerance() {
        let header = compute_signature_header(SECRET, NOW - 30, BODY);
        assert!(verifier()
            .with_tolerance_secs(10)
            .verify_at(BODY, &header, NOW)
            .is_err());
    }

    #[test]
    fn verify_signature_future_timestamp() {
        let header = compute_signature_header(SECRET, NOW + 120, BODY);
        assert!(verifier().verify_at(BODY, &header, NOW).is_err());
    }

    #[test]
    fn verify_signature_small_future_tolerance() {
        let header = compute_signature_header(SECRET, NOW + 30, BODY);
        assert!(verifier().verify_at(BODY, &header, NOW).is_ok());
    }

    #[test]
    fn any_matching_v1_is_accepted() {
        let good = compute_signature_header(SECRET, NOW, BODY);
        let good_sig = good.split("v1=").nth(1).unwrap();
        let header = format!("t={},v1={},v1={}", NOW, "00".repeat(32), good_sig);
        assert!(verifier().verify_at(BODY, &header, NOW).is_ok());
    }

    #[test]
    fn malformed_header_is_rejected() {
        assert!(verifier().verify_at(BODY, "garbage", NOW).is_err());
        assert!(verifier().verify_at(BODY, "", NOW).is_err());
    }
}
