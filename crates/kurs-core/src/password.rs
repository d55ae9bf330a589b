//! Password hashing, verification and the password policy.
//!
//! Every plaintext password accepted by the API (registration, profile
//! update, reset) goes through [`check_password_policy`] before it is hashed
//! with [`hash_password`].

use bcrypt::{hash, verify};

use crate::errors::AppError;

/// bcrypt work factor used for every stored password.
pub const BCRYPT_COST: u32 = 10;

pub const PASSWORD_MIN_LENGTH: usize = 8;

/// Symbols accepted in passwords. At least one of them is required.
pub const PASSWORD_SYMBOLS: &str = "@#-_$%^&+=§!?";

pub const PASSWORD_LENGTH_MESSAGE: &str = "Parol kamida 8 ta belgidan iborat bo'lishi kerak.";
pub const PASSWORD_POLICY_MESSAGE: &str = "Parolda kamida 1 ta katta harf, 1 ta kichik harf, 1 ta raqam va maxsus belgi boʻlishi kerak.";

pub fn hash_password(password: &str) -> Result<String, AppError> {
    hash(password, BCRYPT_COST)
        .map_err(|e| AppError::internal(anyhow::anyhow!("Failed to hash password: {}", e)))
}

/// Returns `Ok(false)` on mismatch; errors only when `hash` is not a bcrypt hash.
pub fn verify_password(password: &str, hash: &str) -> Result<bool, AppError> {
    verify(password, hash)
        .map_err(|e| AppError::internal(anyhow::anyhow!("Failed to verify password: {}", e)))
}

/// Checks the uniform password policy: minimum length, at least one
/// uppercase letter, one lowercase letter, one digit and one symbol from
/// [`PASSWORD_SYMBOLS`], and no other characters.
pub fn check_password_policy(password: &str) -> Result<(), AppError> {
    if password.chars().count() < PASSWORD_MIN_LENGTH {
        return Err(AppError::bad_request(PASSWORD_LENGTH_MESSAGE));
    }

    let is_symbol = |c: char| PASSWORD_SYMBOLS.contains(c);
    let allowed = password
        .chars()
        .all(|c| c.is_ascii_alphanumeric() || is_symbol(c));
    let has_upper = password.chars().any(|c| c.is_ascii_uppercase());
    let has_lower = password.chars().any(|c| c.is_ascii_lowercase());
    let has_digit = password.chars().any(|c| c.is_ascii_digit());
    let has_symbol = password.chars().any(is_symbol);

    if allowed && has_upper && has_lower && has_digit && has_symbol {
        Ok(())
    } else {
        Err(AppError::bad_request(PASSWORD_POLICY_MESSAGE))
    }
}
