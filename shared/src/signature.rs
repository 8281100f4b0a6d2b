//! LINE webhook signature verification.
//!
//! `X-Line-Signature` carries the base64 HMAC-SHA256 of the raw request body,
//! keyed with the channel secret.

use base64::engine::general_purpose::STANDARD;
use base64::Engine;
use hmac::{Hmac, Mac};
use sha2::Sha256;

use crate::{Error, Result};

type HmacSha256 = Hmac<Sha256>;

/// Compute the signature LINE would send for `body`.
pub fn sign(channel_secret: &str, body: &[u8]) -> Result<String> {
    let mut mac = HmacSha256::new_from_slice(channel_secret.as_bytes())
        .map_err(|e| Error::Config(format!("Invalid channel secret: {}", e)))?;
    mac.update(body);
    Ok(STANDARD.encode(mac.finalize().into_bytes()))
}

/// Verify `signature` against `body`.
pub fn verify(channel_secret: &str, signature: &str, body: &[u8]) -> Result<()> {
    let expected = STANDARD
        .decode(signature.trim())
        .map_err(|_| Error::Signature("Signature is not valid base64".to_string()))?;

    let mut mac = HmacSha256::new_from_slice(channel_secret.as_bytes())
        .map_err(|e| Error::Config(format!("Invalid channel secret: {}", e)))?;
    mac.update(body);
    mac.verify_slice(&expected)
        .map_err(|_| Error::Signature("Signature mismatch".to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;

    const SECRET: &str = "test-channel-secret";
    const BODY: &[u8] = br#"{"events":[]}"#;
    const KNOWN_SIGNATURE: &str = "sKRrt+MTE71nWWZPaYrvYSdH9JGlgckmBidZxDuPgPc=";

    #[test]
    fn test_sign_known_vector() {
        assert_eq!(sign(SECRET, BODY).unwrap(), KNOWN_SIGNATURE);
    }

    #[test]
    fn test_verify_accepts_valid_signature() {
        assert!(verify(SECRET, KNOWN_SIGNATURE, BODY).is_ok());
    }

    #[test]
    fn test_verify_rejects_tampered_body() {
        let err = verify(SECRET, KNOWN_SIGNATURE, br#"{"events":[{}]}"#).unwrap_err();
        assert!(matches!(err, Error::Signature(_)));
    }

    #[test]
    fn test_verify_rejects_wrong_secret() {
        let err = verify("other-secret", KNOWN_SIGNATURE, BODY).unwrap_err();
        assert!(matches!(err, Error::Signature(_)));
    }

    #[test]
    fn test_verify_rejects_garbage() {
        let err = verify(SECRET, "!!not base64!!", BODY).unwrap_err();
        assert!(matches!(err, Error::Signature(_)));
    }
}
