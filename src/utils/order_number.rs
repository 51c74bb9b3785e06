//! Human-readable order numbers.

use chrono::{DateTime, Utc};
use rand::Rng;

const CHARSET: &[u8] = b"ABCDEFGHJKLMNPQRSTUVWXYZ23456789";
const SUFFIX_LEN: usize = 6;

/// Generates an order number such as `ORD-250314-K7QX2M`.
///
/// The date part is the creation day (UTC); the suffix avoids the
/// look-alike characters `0`, `O`, `1` and `I`.
pub fn generate_order_number(now: DateTime<Utc>) -> String {
    let mut rng = rand::rng();
    let suffix: String = (0..SUFFIX_LEN)
        .map(|_| CHARSET[rng.random_range(0..CHARSET.len())] as char)
        .collect();

    format!("ORD-{}-{}", now.format("%y%m%d"), suffix)
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    #[test]
    fn test_format() {
        let now = Utc.with_ymd_and_hms(2025, 3, 14, 9, 30, 0).unwrap();
        let number = generate_order_number(now);

        assert!(number.starts_with("ORD-250314-"));
        assert_eq!(number.len(), "ORD-250314-".len() + SUFFIX_LEN);
        assert!(number[11..].bytes().all(|b| CHARSET.contains(&b)));
    }
}
