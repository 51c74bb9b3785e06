//! Shared input validation rules.

use regex::Regex;
use std::sync::LazyLock;

/// Phone numbers: optional leading `+`, then 10 to 15 digits.
pub static PHONE_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^\+?[0-9]{10,15}$").expect("valid phone regex"));

/// Postal codes: 4 to 10 digits.
pub static PINCODE_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[0-9]{4,10}$").expect("valid pincode regex"));

/// Normalizes an email for storage and lookup.
pub fn normalize_email(email: &str) -> String {
    email.trim().to_lowercase()
}
