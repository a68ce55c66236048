//! Cryptographic utilities for pass signing.
//!
//! Entry passes carry a keyed HMAC-SHA256 signature over their canonical
//! serialization. The key never leaves the server; clients only see the
//! hex-encoded tag.

use hmac::{Hmac, Mac};
use sha2::Sha256;

type HmacSha256 = Hmac<Sha256>;

/// Computes the HMAC-SHA256 tag of `message` under `key` as a hex string.
pub fn sign_hex(key: &[u8], message: &str) -> String {
    let mut mac = HmacSha256::new_from_slice(key).expect("HMAC accepts keys of any length");
    mac.update(message.as_bytes());
    hex::encode(mac.finalize().into_bytes())
}

/// Verifies a hex-encoded HMAC-SHA256 tag in constant time.
///
/// Returns false for malformed hex as well as for a mismatched tag.
pub fn verify_hex(key: &[u8], message: &str, signature_hex: &str) -> bool {
    let Ok(expected) = hex::decode(signature_hex) else {
        return false;
    };
    let mut mac = HmacSha256::new_from_slice(key).expect("HMAC accepts keys of any length");
    mac.update(message.as_bytes());
    mac.verify_slice(&expected).is_ok()
}

#[cfg(test)]
mod tests {
    use super::*;

    const KEY: &[u8] = b"test-signing-secret";

    #[test]
    fn test_sign_hex_length() {
        let tag = sign_hex(KEY, "payload");
        // SHA-256 output is 32 bytes, 64 hex chars
        assert_eq!(tag.len(), 64);
    }

    #[test]
    fn test_sign_hex_deterministic() {
        assert_eq!(sign_hex(KEY, "same_input"), sign_hex(KEY, "same_input"));
    }

    #[test]
    fn test_sign_hex_different_messages() {
        assert_ne!(sign_hex(KEY, "message1"), sign_hex(KEY, "message2"));
    }

    #[test]
    fn test_sign_hex_different_keys() {
        assert_ne!(sign_hex(b"key-a", "message"), sign_hex(b"key-b", "message"));
    }

    #[test]
    fn test_verify_hex_roundtrip() {
        let tag = sign_hex(KEY, "visitor payload");
        assert!(verify_hex(KEY, "visitor payload", &tag));
    }

    #[test]
    fn test_verify_hex_rejects_tampered_message() {
        let tag = sign_hex(KEY, "visitor payload");
        assert!(!verify_hex(KEY, "visitor payload!", &tag));
    }

    #[test]
    fn test_verify_hex_rejects_wrong_key() {
        let tag = sign_hex(KEY, "visitor payload");
        assert!(!verify_hex(b"other-key", "visitor payload", &tag));
    }

    #[test]
    fn test_verify_hex_rejects_malformed_hex() {
        assert!(!verify_hex(KEY, "visitor payload", "not-hex-at-all"));
        assert!(!verify_hex(KEY, "visitor payload", ""));
    }

    #[test]
    fn test_sign_hex_unicode_message() {
        let tag = sign_hex(KEY, "访客通行证");
        assert!(verify_hex(KEY, "访客通行证", &tag));
    }
}
