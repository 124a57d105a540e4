//! Keyed request signing for cross-service callbacks.
//!
//! The payment service proves the origin of its notifications to the order
//! service with an HMAC-SHA256 over `method + path + raw_body + epoch_seconds`,
//! hex-encoded in the `X-Signature` header alongside an RFC3339 `X-Timestamp`.
//! Verification rejects anything older than the freshness window (5 minutes by
//! default) and compares signatures in constant time.
//!
//! There is no nonce store: a captured signature stays replayable within the
//! freshness window. The window bounds that exposure; it does not remove it.

use chrono::{DateTime, Duration, Utc};
use hmac::{Hmac, Mac};
use sha2::Sha256;

type HmacSha256 = Hmac<Sha256>;

/// Header carrying the hex-encoded HMAC-SHA256 signature.
pub const SIGNATURE_HEADER: &str = "X-Signature";

/// Header carrying the RFC3339 timestamp the signature was computed with.
pub const TIMESTAMP_HEADER: &str = "X-Timestamp";

/// Signs and verifies cross-service requests with a shared secret.
///
/// Both services construct this from the same out-of-band secret; the
/// signature binds the HTTP method, the request path, the exact body bytes,
/// and the timestamp's epoch-seconds representation.
#[derive(Clone)]
pub struct RequestSigner {
    secret: Vec<u8>,
    max_age: Duration,
}

impl RequestSigner {
    /// Creates a signer with the default 5-minute freshness window.
    pub fn new(secret: impl Into<Vec<u8>>) -> Self {
        Self::with_max_age(secret, Duration::minutes(5))
    }

    /// Creates a signer with an explicit freshness window.
    pub fn with_max_age(secret: impl Into<Vec<u8>>, max_age: Duration) -> Self {
        Self {
            secret: secret.into(),
            max_age,
        }
    }

    /// Computes the hex-encoded signature for a request.
    pub fn sign(&self, method: &str, path: &str, body: &[u8], timestamp: DateTime<Utc>) -> String {
        hex::encode(self.mac(method, path, body, timestamp).finalize().into_bytes())
    }

    /// Verifies an inbound request.
    ///
    /// Returns false if either header is missing, the timestamp does not
    /// parse as RFC3339, the timestamp is older than the freshness window,
    /// or the signature does not match. The caller learns nothing about
    /// which check failed.
    pub fn verify(
        &self,
        method: &str,
        path: &str,
        body: &[u8],
        signature: Option<&str>,
        timestamp: Option<&str>,
    ) -> bool {
        let (Some(signature), Some(timestamp)) = (signature, timestamp) else {
            return false;
        };

        let Ok(parsed) = DateTime::parse_from_rfc3339(timestamp) else {
            return false;
        };
        let parsed = parsed.with_timezone(&Utc);

        if Utc::now() - parsed > self.max_age {
            return false;
        }

        let Ok(provided) = hex::decode(signature) else {
            return false;
        };

        // verify_slice compares in constant time.
        self.mac(method, path, body, parsed)
            .verify_slice(&provided)
            .is_ok()
    }

    fn mac(&self, method: &str, path: &str, body: &[u8], timestamp: DateTime<Utc>) -> HmacSha256 {
        let mut mac = HmacSha256::new_from_slice(&self.secret)
            .expect("HMAC-SHA256 accepts keys of any length");
        mac.update(method.as_bytes());
        mac.update(path.as_bytes());
        mac.update(body);
        mac.update(timestamp.timestamp().to_string().as_bytes());
        mac
    }
}

impl std::fmt::Debug for RequestSigner {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        // The secret never appears in logs or error output.
        f.debug_struct("RequestSigner")
            .field("max_age", &self.max_age)
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const METHOD: &str = "POST";
    const PATH: &str = "/backend/payment-update";
    const BODY: &[u8] = br#"{"order_id":"abc","status":"Completed","amount":2000}"#;

    fn signer() -> RequestSigner {
        RequestSigner::new("test-secret")
    }

    fn signed(timestamp: DateTime<Utc>) -> (String, String) {
        let signature = signer().sign(METHOD, PATH, BODY, timestamp);
        (signature, timestamp.to_rfc3339())
    }

    #[test]
    fn sign_is_deterministic() {
        let ts = Utc::now();
        let sig1 = signer().sign(METHOD, PATH, BODY, ts);
        let sig2 = signer().sign(METHOD, PATH, BODY, ts);
        assert_eq!(sig1, sig2);
        // SHA-256 = 32 bytes = 64 hex chars
        assert_eq!(sig1.len(), 64);
    }

    #[test]
    fn verify_accepts_fresh_signature() {
        let (sig, ts) = signed(Utc::now());
        assert!(signer().verify(METHOD, PATH, BODY, Some(&sig), Some(&ts)));
    }

    #[test]
    fn verify_accepts_four_minute_old_signature() {
        let (sig, ts) = signed(Utc::now() - Duration::minutes(4));
        assert!(signer().verify(METHOD, PATH, BODY, Some(&sig), Some(&ts)));
    }

    #[test]
    fn verify_rejects_six_minute_old_signature() {
        let (sig, ts) = signed(Utc::now() - Duration::minutes(6));
        assert!(!signer().verify(METHOD, PATH, BODY, Some(&sig), Some(&ts)));
    }

    #[test]
    fn verify_rejects_missing_headers() {
        let (sig, ts) = signed(Utc::now());
        assert!(!signer().verify(METHOD, PATH, BODY, None, Some(&ts)));
        assert!(!signer().verify(METHOD, PATH, BODY, Some(&sig), None));
        assert!(!signer().verify(METHOD, PATH, BODY, None, None));
    }

    #[test]
    fn verify_rejects_unparseable_timestamp() {
        let (sig, _) = signed(Utc::now());
        assert!(!signer().verify(METHOD, PATH, BODY, Some(&sig), Some("yesterday")));
    }

    #[test]
    fn verify_rejects_tampered_body() {
        let (sig, ts) = signed(Utc::now());
        let tampered = br#"{"order_id":"abc","status":"Completed","amount":1}"#;
        assert!(!signer().verify(METHOD, PATH, tampered, Some(&sig), Some(&ts)));
    }

    #[test]
    fn verify_rejects_wrong_method_or_path() {
        let (sig, ts) = signed(Utc::now());
        assert!(!signer().verify("PUT", PATH, BODY, Some(&sig), Some(&ts)));
        assert!(!signer().verify(METHOD, "/other", BODY, Some(&sig), Some(&ts)));
    }

    #[test]
    fn verify_rejects_wrong_secret() {
        let ts = Utc::now();
        let sig = RequestSigner::new("other-secret").sign(METHOD, PATH, BODY, ts);
        assert!(!signer().verify(METHOD, PATH, BODY, Some(&sig), Some(&ts.to_rfc3339())));
    }

    #[test]
    fn verify_rejects_non_hex_signature() {
        let ts = Utc::now().to_rfc3339();
        assert!(!signer().verify(METHOD, PATH, BODY, Some("zzzz"), Some(&ts)));
    }

    #[test]
    fn custom_window_applies() {
        let strict = RequestSigner::with_max_age("test-secret", Duration::seconds(30));
        let ts = Utc::now() - Duration::minutes(1);
        let sig = strict.sign(METHOD, PATH, BODY, ts);
        assert!(!strict.verify(METHOD, PATH, BODY, Some(&sig), Some(&ts.to_rfc3339())));
    }
}
