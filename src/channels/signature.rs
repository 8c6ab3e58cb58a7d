//! Webhook signature verification.
//!
//! The platform signs every request body with HMAC-SHA256 keyed by the
//! channel secret and sends the base64 digest in `X-Line-Signature`.

use base64::Engine;
use base64::engine::general_purpose::STANDARD;
use hmac::{Hmac, Mac};
use secrecy::{ExposeSecret, SecretString};
use sha2::Sha256;

use crate::error::WebhookError;

type HmacSha256 = Hmac<Sha256>;

/// Checks request bodies against the channel secret.
#[derive(Clone)]
pub struct SignatureVerifier {
    channel_secret: SecretString,
}

impl SignatureVerifier {
    pub fn new(channel_secret: SecretString) -> Self {
        Self { channel_secret }
    }

    /// Verify `signature` (base64) over the raw `body`. Constant-time.
    pub fn verify(&self, body: &[u8], signature: &str) -> Result<(), WebhookError> {
        let expected = STANDARD
            .decode(signature.trim())
            .map_err(|_| WebhookError::InvalidSignature)?;

        let mut mac = HmacSha256::new_from_slice(self.channel_secret.expose_secret().as_bytes())
            .map_err(|_| WebhookError::InvalidSignature)?;
        mac.update(body);
        mac.verify_slice(&expected)
            .map_err(|_| WebhookError::InvalidSignature)
    }

    /// Produce the signature for `body`.
    pub fn sign(&self, body: &[u8]) -> String {
        sign(self.channel_secret.expose_secret(), body)
    }
}

/// base64(HMAC-SHA256(secret, body)).
pub fn sign(secret: &str, body: &[u8]) -> String {
    let mut mac = match HmacSha256::new_from_slice(secret.as_bytes()) {
        Ok(mac) => mac,
        Err(_) => unreachable!("HMAC-SHA256 accepts any key length"),
    };
    mac.update(body);
    STANDARD.encode(mac.finalize().into_bytes())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn verifier() -> SignatureVerifier {
        SignatureVerifier::new(SecretString::from("channel-secret"))
    }

    #[test]
    fn accepts_own_signature() {
        let body = br#"{"destination":"U0","events":[]}"#;
        let v = verifier();
        let sig = v.sign(body);
        assert!(v.verify(body, &sig).is_ok());
    }

    #[test]
    fn rejects_tampered_body() {
        let v = verifier();
        let sig = v.sign(b"original");
        assert!(matches!(
            v.verify(b"tampered", &sig),
            Err(WebhookError::InvalidSignature)
        ));
    }

    #[test]
    fn rejects_other_secret() {
        let body = b"payload";
        let sig = sign("another-secret", body);
        assert!(verifier().verify(body, &sig).is_err());
    }

    #[test]
    fn rejects_non_base64_signature() {
        assert!(verifier().verify(b"payload", "not base64 !!").is_err());
    }

    #[test]
    fn rejects_empty_signature() {
        assert!(verifier().verify(b"payload", "").is_err());
    }

    #[test]
    fn signature_is_base64_sha256_length() {
        let sig = sign("k", b"x");
        assert_eq!(STANDARD.decode(sig).unwrap().len(), 32);
    }
}
