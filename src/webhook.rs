//! Inbound webhook authentication.
//!
//! Linear signs every delivery with HMAC-SHA256 over the raw request body and
//! sends the hex digest in the `linear-signature` header. The digest is
//! recomputed here with the shared secret and compared in constant time.

use hmac::{Hmac, Mac};
use sha2::Sha256;

use crate::error::AppError;

pub const SIGNATURE_HEADER: &str = "linear-signature";

type HmacSha256 = Hmac<Sha256>;

#[derive(Clone)]
pub struct WebhookVerifier {
    secret: Option<String>,
}

impl std::fmt::Debug for WebhookVerifier {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("WebhookVerifier")
            .field("configured", &self.secret.is_some())
            .finish()
    }
}

impl WebhookVerifier {
    /// `None` leaves the verifier unconfigured; every delivery is then rejected.
    pub fn new(secret: Option<String>) -> Self {
        Self { secret }
    }

    pub fn is_configured(&self) -> bool {
        self.secret.is_some()
    }

    /// Hex-encoded HMAC-SHA256 of `raw_body`, or `None` when no secret is configured.
    pub fn sign(&self, raw_body: &[u8]) -> Option<String> {
        let mut mac = self.mac()?;
        mac.update(raw_body);
        Some(hex::encode(mac.finalize().into_bytes()))
    }

    /// Accepts the delivery only if `signature` is the HMAC of exactly `raw_body`.
    pub fn verify(&self, signature: Option<&str>, raw_body: &[u8]) -> Result<(), AppError> {
        let signature = signature
            .map(str::trim)
            .filter(|s| !s.is_empty())
            .ok_or_else(|| AppError::Unauthorized("Linear signature is missing".into()))?;

        let mut mac = self.mac().ok_or_else(|| {
            AppError::Unauthorized("Linear webhook secret is not configured".into())
        })?;

        if raw_body.is_empty() {
            return Err(AppError::Unauthorized("Request body is missing".into()));
        }

        let expected = hex::decode(signature)
            .map_err(|_| AppError::Unauthorized("Invalid Linear signature".into()))?;

        mac.update(raw_body);
        // verify_slice compares in constant time and rejects length mismatches.
        mac.verify_slice(&expected)
            .map_err(|_| AppError::Unauthorized("Invalid Linear signature".into()))
    }

    fn mac(&self) -> Option<HmacSha256> {
        let secret = self.secret.as_ref()?;
        HmacSha256::new_from_slice(secret.as_bytes()).ok()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const SECRET: &str = "lin_wh_test_secret";

    fn unauthorized_message(result: Result<(), AppError>) -> String {
        match result {
            Err(AppError::Unauthorized(msg)) => msg,
            other => panic!("expected Unauthorized, got {:?}", other),
        }
    }

    #[test]
    fn test_valid_signature_is_accepted() {
        let verifier = WebhookVerifier::new(Some(SECRET.to_string()));
        let body = br#"{"action":"create","type":"Issue"}"#;
        let signature = verifier.sign(body).unwrap();

        assert_eq!(signature.len(), 64);
        assert!(verifier.verify(Some(&signature), body).is_ok());
        assert!(verifier
            .verify(Some(&signature.to_uppercase()), body)
            .is_ok());
    }

    #[test]
    fn test_signature_over_other_body_is_rejected() {
        let verifier = WebhookVerifier::new(Some(SECRET.to_string()));
        let signature = verifier.sign(br#"{"amount":1}"#).unwrap();

        let msg = unauthorized_message(verifier.verify(Some(&signature), br#"{"amount":2}"#));
        assert_eq!(msg, "Invalid Linear signature");
    }

    #[test]
    fn test_signature_with_other_secret_is_rejected() {
        let body = b"payload";
        let forged = WebhookVerifier::new(Some("other-secret".to_string()))
            .sign(body)
            .unwrap();
        let verifier = WebhookVerifier::new(Some(SECRET.to_string()));

        assert!(verifier.verify(Some(&forged), body).is_err());
    }

    #[test]
    fn test_missing_signature() {
        let verifier = WebhookVerifier::new(Some(SECRET.to_string()));
        assert_eq!(
            unauthorized_message(verifier.verify(None, b"payload")),
            "Linear signature is missing"
        );
        assert_eq!(
            unauthorized_message(verifier.verify(Some("  "), b"payload")),
            "Linear signature is missing"
        );
    }

    #[test]
    fn test_unconfigured_secret_rejects_everything() {
        let verifier = WebhookVerifier::new(None);
        assert!(!verifier.is_configured());
        assert!(verifier.sign(b"payload").is_none());
        assert_eq!(
            unauthorized_message(verifier.verify(Some("00"), b"payload")),
            "Linear webhook secret is not configured"
        );
    }

    #[test]
    fn test_missing_body() {
        let verifier = WebhookVerifier::new(Some(SECRET.to_string()));
        let signature = verifier.sign(b"").unwrap();
        assert_eq!(
            unauthorized_message(verifier.verify(Some(&signature), b"")),
            "Request body is missing"
        );
    }

    #[test]
    fn test_malformed_or_truncated_signatures() {
        let verifier = WebhookVerifier::new(Some(SECRET.to_string()));
        let body = b"payload";
        let signature = verifier.sign(body).unwrap();

        assert!(verifier.verify(Some("not-hex"), body).is_err());
        assert!(verifier.verify(Some(&signature[..62]), body).is_err());
        assert!(verifier.verify(Some(&format!("{}00", signature)), body).is_err());
    }
}
