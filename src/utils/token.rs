//! Random secrets and keyed hashing.
//!
//! Session tokens and OTP codes are never stored in clear text; only their
//! HMAC-SHA256 digest (keyed by the server signing secret) is persisted.

use base64::Engine as _;
use hmac::{Hmac, Mac};
use rand::Rng;
use sha2::Sha256;

type HmacSha256 = Hmac<Sha256>;

/// Length of random bytes before base64 encoding.
const TOKEN_LENGTH_BYTES: usize = 32;

/// Number of digits in a login code.
pub const OTP_DIGITS: usize = 6;

/// Generates a bearer token: 32 random bytes as URL-safe base64 (43 chars).
pub fn generate_token() -> String {
    let mut buffer = [0u8; TOKEN_LENGTH_BYTES];
    rand::rng().fill(&mut buffer[..]);
    base64::engine::general_purpose::URL_SAFE_NO_PAD.encode(buffer)
}

/// Generates a zero-padded numeric login code.
pub fn generate_otp() -> String {
    let code: u32 = rand::rng().random_range(0..1_000_000);
    format!("{code:0width$}", width = OTP_DIGITS)
}

/// Generates a random file stem for stored uploads.
pub fn generate_file_stem() -> String {
    let mut buffer = [0u8; 16];
    rand::rng().fill(&mut buffer[..]);
    hex::encode(buffer)
}

/// HMAC-SHA256 of `value` keyed by `secret`, as 64 lowercase hex chars.
pub fn keyed_hash(secret: &str, value: &str) -> String {
    let mut mac =
        HmacSha256::new_from_slice(secret.as_bytes()).expect("HMAC accepts any key length");
    mac.update(value.as_bytes());
    hex::encode(mac.finalize().into_bytes())
}

/// Constant-time check of `value` against a hex digest from [`keyed_hash`].
pub fn keyed_hash_matches(secret: &str, value: &str, expected_hex: &str) -> bool {
    let Ok(expected) = hex::decode(expected_hex) else {
        return false;
    };

    let mut mac =
        HmacSha256::new_from_slice(secret.as_bytes()).expect("HMAC accepts any key length");
    mac.update(value.as_bytes());
    mac.verify_slice(&expected).is_ok()
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;

    #[test]
    fn test_token_shape() {
        let token = generate_token();
        assert_eq!(token.len(), 43);
        assert!(
            token
                .chars()
                .all(|c| c.is_ascii_alphanumeric() || c == '-' || c == '_')
        );
    }

    #[test]
    fn test_tokens_unique() {
        let tokens: HashSet<String> = (0..200).map(|_| generate_token()).collect();
        assert_eq!(tokens.len(), 200);
    }

    #[test]
    fn test_otp_is_six_digits() {
        for _ in 0..200 {
            let code = generate_otp();
            assert_eq!(code.len(), OTP_DIGITS);
            assert!(code.chars().all(|c| c.is_ascii_digit()));
        }
    }

    #[test]
    fn test_keyed_hash_is_deterministic_hex() {
        let a = keyed_hash("secret", "token");
        assert_eq!(a, keyed_hash("secret", "token"));
        assert_eq!(a.len(), 64);
        assert!(a.chars().all(|c| c.is_ascii_hexdigit()));
    }

    #[test]
    fn test_secret_matters() {
        assert_ne!(keyed_hash("secret-a", "token"), keyed_hash("secret-b", "token"));
    }

    #[test]
    fn test_matches() {
        let digest = keyed_hash("secret", "123456");
        assert!(keyed_hash_matches("secret", "123456", &digest));
        assert!(!keyed_hash_matches("secret", "654321", &digest));
        assert!(!keyed_hash_matches("secret", "123456", "zz"));
    }

    #[test]
    fn test_file_stem() {
        let stem = generate_file_stem();
        assert_eq!(stem.len(), 32);
        assert_ne!(stem, generate_file_stem());
    }
}
