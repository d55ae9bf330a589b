//! One-time password-reset codes.
//!
//! A code is six decimal digits and lives for three minutes. Persisting it
//! (and overwriting any previous code) is the caller's job.

use chrono::{DateTime, Duration, Utc};
use rand::Rng;

pub const RESET_CODE_TTL_SECONDS: i64 = 180;
pub const RESET_CODE_LENGTH: usize = 6;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResetCode {
    pub code: String,
    pub expires_at: DateTime<Utc>,
}

impl ResetCode {
    pub fn generate() -> Self {
        Self::generate_at(Utc::now())
    }

    pub fn generate_at(now: DateTime<Utc>) -> Self {
        let code: u32 = rand::thread_rng().gen_range(100_000..=999_999);
        Self {
            code: code.to_string(),
            expires_at: now + Duration::seconds(RESET_CODE_TTL_SECONDS),
        }
    }
}

/// Cheap shape check before touching the store.
pub fn is_well_formed(code: &str) -> bool {
    code.len() == RESET_CODE_LENGTH && code.chars().all(|c| c.is_ascii_digit())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_codes_are_six_digits_in_range() {
        for _ in 0..200 {
            let reset = ResetCode::generate();
            assert!(is_well_formed(&reset.code));
            let value: u32 = reset.code.parse().unwrap();
            assert!((100_000..=999_999).contains(&value));
        }
    }

    #[test]
    fn test_code_expires_after_three_minutes() {
        let now = Utc::now();
        let reset = ResetCode::generate_at(now);

        assert_eq!(reset.expires_at, now + Duration::seconds(180));
    }

    #[test]
    fn test_is_well_formed() {
        assert!(is_well_formed("123456"));
        assert!(!is_well_formed("12345"));
        assert!(!is_well_formed("1234567"));
        assert!(!is_well_formed("12a456"));
    }
}
