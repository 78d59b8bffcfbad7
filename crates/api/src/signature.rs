//! Webhook authenticity check.
//!
//! The platform signs every delivery with HMAC-SHA256 over the raw request
//! body, keyed by the app's API secret, and sends the base64 digest in a
//! header. Anything that fails this check never reaches the core.

use base64::engine::general_purpose::STANDARD;
use base64::Engine;
use hmac::{Hmac, Mac};
use sha2::Sha256;
use thiserror::Error;

type HmacSha256 = Hmac<Sha256>;

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum SignatureError {
    #[error("signature header is not valid base64")]
    Encoding,

    #[error("signature does not match body")]
    Mismatch,
}

#[derive(Clone)]
pub struct WebhookVerifier {
    secret: Vec<u8>,
}

impl core::fmt::Debug for WebhookVerifier {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("WebhookVerifier").finish_non_exhaustive()
    }
}

impl WebhookVerifier {
    pub fn new(secret: impl Into<Vec<u8>>) -> Self {
        Self {
            secret: secret.into(),
        }
    }

    fn mac(&self, body: &[u8]) -> HmacSha256 {
        // HMAC accepts keys of any length.
        let mut mac = <HmacSha256 as Mac>::new_from_slice(&self.secret)
            .unwrap_or_else(|_| unreachable!("hmac key of any size is valid"));
        mac.update(body);
        mac
    }

    /// Base64 signature of `body`, as the platform would send it.
    pub fn sign(&self, body: &[u8]) -> String {
        STANDARD.encode(self.mac(body).finalize().into_bytes())
    }

    /// Constant-time check of `signature_b64` against `body`.
    pub fn verify(&self, body: &[u8], signature_b64: &str) -> Result<(), SignatureError> {
        let expected = STANDARD
            .decode(signature_b64.trim())
            .map_err(|_| SignatureError::Encoding)?;
        self.mac(body)
            .verify_slice(&expected)
            .map_err(|_| SignatureError::Mismatch)
    }
}
