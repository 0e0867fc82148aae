use chrono::{DateTime, Utc};
use rand::Rng;

/// How many times callers should regenerate before giving up on finding an
/// unused number.
pub const MAX_ATTEMPTS: usize = 5;

/// Human-readable order number: `ORD` + YYMMDD + zero-padded 4-digit random
/// suffix. The suffix can collide within a day; callers retry up to
/// [`MAX_ATTEMPTS`] times against the set of existing numbers.
pub fn generate(now: DateTime<Utc>) -> String {
    let suffix: u32 = rand::rng().random_range(0..10_000);
    format!("ORD{}{:04}", now.format("%y%m%d"), suffix)
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    #[test]
    fn has_prefix_date_and_four_digit_suffix() {
        let now = Utc.with_ymd_and_hms(2026, 8, 24, 12, 0, 0).unwrap();
        let number = generate(now);
        assert_eq!(number.len(), 13);
        assert!(number.starts_with("ORD260824"));
        assert!(number[9..].chars().all(|c| c.is_ascii_digit()));
    }

    #[test]
    fn suffix_is_zero_padded() {
        let now = Utc.with_ymd_and_hms(2026, 1, 5, 0, 0, 0).unwrap();
        for _ in 0..100 {
            let number = generate(now);
            assert_eq!(number.len(), 13, "suffix must always be four digits");
        }
    }
}
