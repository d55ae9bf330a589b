//! JWT creation and verification.
//!
//! Expiry is checked here rather than by `jsonwebtoken` so that a token is
//! expired exactly when `now >= exp`, with no leeway, and so tests can pin
//! the clock through the `*_at` variants.

use chrono::Utc;
use jsonwebtoken::{Algorithm, DecodingKey, EncodingKey, Header, Validation, decode, encode};
use thiserror::Error;
use uuid::Uuid;

use kurs_config::JwtConfig;
use kurs_core::AppError;

use crate::claims::{Claims, TokenKind};

#[derive(Debug, Error, PartialEq, Eq)]
pub enum TokenError {
    #[error("token expired")]
    Expired,
    #[error("invalid token")]
    Invalid,
}

fn secret_for(kind: TokenKind, jwt_config: &JwtConfig) -> &[u8] {
    match kind {
        TokenKind::Access => jwt_config.access_secret.as_bytes(),
        TokenKind::Refresh => jwt_config.refresh_secret.as_bytes(),
    }
}

fn lifetime_for(kind: TokenKind, jwt_config: &JwtConfig) -> i64 {
    match kind {
        TokenKind::Access => jwt_config.access_token_expiry,
        TokenKind::Refresh => jwt_config.refresh_token_expiry,
    }
}

/// Creates a token of `kind` as if issued at `now` (Unix seconds).
pub fn create_token_at(
    kind: TokenKind,
    user_id: Uuid,
    role: &str,
    jwt_config: &JwtConfig,
    now: i64,
) -> Result<String, AppError> {
    let claims = Claims {
        sub: user_id.to_string(),
        role: role.to_string(),
        kind,
        exp: now + lifetime_for(kind, jwt_config),
        iat: now,
    };

    encode(
        &Header::new(Algorithm::HS256),
        &claims,
        &EncodingKey::from_secret(secret_for(kind, jwt_config)),
    )
    .map_err(|e| AppError::internal(anyhow::anyhow!("Failed to create token: {}", e)))
}

pub fn create_access_token(
    user_id: Uuid,
    role: &str,
    jwt_config: &JwtConfig,
) -> Result<String, AppError> {
    create_token_at(
        TokenKind::Access,
        user_id,
        role,
        jwt_config,
        Utc::now().timestamp(),
    )
}

pub fn create_refresh_token(
    user_id: Uuid,
    role: &str,
    jwt_config: &JwtConfig,
) -> Result<String, AppError> {
    create_token_at(
        TokenKind::Refresh,
        user_id,
        role,
        jwt_config,
        Utc::now().timestamp(),
    )
}

/// Verifies signature, shape and kind, then expiry against `now`.
pub fn verify_token_at(
    token: &str,
    kind: TokenKind,
    jwt_config: &JwtConfig,
    now: i64,
) -> Result<Claims, TokenError> {
    let mut validation = Validation::new(Algorithm::HS256);
    validation.validate_exp = false;

    let claims = decode::<Claims>(
        token,
        &DecodingKey::from_secret(secret_for(kind, jwt_config)),
        &validation,
    )
    .map_err(|_| TokenError::Invalid)?
    .claims;

    if claims.kind != kind {
        return Err(TokenError::Invalid);
    }

    if now >= claims.exp {
        return Err(TokenError::Expired);
    }

    Ok(claims)
}

pub fn verify_token(
    token: &str,
    kind: TokenKind,
    jwt_config: &JwtConfig,
) -> Result<Claims, TokenError> {
    verify_token_at(token, kind, jwt_config, Utc::now().timestamp())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn config() -> JwtConfig {
        JwtConfig {
            access_secret: "access-test-secret".to_string(),
            refresh_secret: "refresh-test-secret".to_string(),
            access_token_expiry: 3600,
            refresh_token_expiry: 86400,
            secure_cookies: false,
        }
    }

    const NOW: i64 = 1_700_000_000;

    #[test]
    fn test_access_token_valid_before_expiry() {
        let config = config();
        let user_id = Uuid::new_v4();
        let token = create_token_at(TokenKind::Access, user_id, "student", &config, NOW).unwrap();

        let claims = verify_token_at(&token, TokenKind::Access, &config, NOW + 3599).unwrap();
        assert_eq!(claims.user_id(), Some(user_id));
        assert_eq!(claims.role, "student");
        assert_eq!(claims.exp, NOW + 3600);
        assert_eq!(claims.iat, NOW);
    }

    #[test]
    fn test_access_token_expired_at_exact_expiry() {
        let config = config();
        let token =
            create_token_at(TokenKind::Access, Uuid::new_v4(), "student", &config, NOW).unwrap();

        assert_eq!(
            verify_token_at(&token, TokenKind::Access, &config, NOW + 3600).unwrap_err(),
            TokenError::Expired
        );
        assert_eq!(
            verify_token_at(&token, TokenKind::Access, &config, NOW + 7200).unwrap_err(),
            TokenError::Expired
        );
    }

    #[test]
    fn test_refresh_token_lives_a_day() {
        let config = config();
        let token =
            create_token_at(TokenKind::Refresh, Uuid::new_v4(), "admin", &config, NOW).unwrap();

        assert!(verify_token_at(&token, TokenKind::Refresh, &config, NOW + 86399).is_ok());
        assert_eq!(
            verify_token_at(&token, TokenKind::Refresh, &config, NOW + 86400).unwrap_err(),
            TokenError::Expired
        );
    }

    #[test]
    fn test_access_token_rejected_as_refresh() {
        let config = config();
        let token =
            create_token_at(TokenKind::Access, Uuid::new_v4(), "student", &config, NOW).unwrap();

        assert_eq!(
            verify_token_at(&token, TokenKind::Refresh, &config, NOW).unwrap_err(),
            TokenError::Invalid
        );
    }

    #[test]
    fn test_refresh_token_rejected_as_access() {
        let config = config();
        let token =
            create_token_at(TokenKind::Refresh, Uuid::new_v4(), "student", &config, NOW).unwrap();

        assert_eq!(
            verify_token_at(&token, TokenKind::Access, &config, NOW).unwrap_err(),
            TokenError::Invalid
        );
    }

    #[test]
    fn test_kind_claim_checked_even_with_shared_secret() {
        let mut config = config();
        config.refresh_secret = config.access_secret.clone();
        let token =
            create_token_at(TokenKind::Refresh, Uuid::new_v4(), "student", &config, NOW).unwrap();

        assert_eq!(
            verify_token_at(&token, TokenKind::Access, &config, NOW).unwrap_err(),
            TokenError::Invalid
        );
    }

    #[test]
    fn test_tampered_token_is_invalid() {
        let config = config();
        let token =
            create_token_at(TokenKind::Access, Uuid::new_v4(), "student", &config, NOW).unwrap();
        let tampered = format!("{}x", token);

        assert_eq!(
            verify_token_at(&tampered, TokenKind::Access, &config, NOW).unwrap_err(),
            TokenError::Invalid
        );
        assert_eq!(
            verify_token("garbage", TokenKind::Access, &config).unwrap_err(),
            TokenError::Invalid
        );
    }

    #[test]
    fn test_fresh_tokens_verify_against_wall_clock() {
        let config = config();
        let user_id = Uuid::new_v4();
        let access = create_access_token(user_id, "student", &config).unwrap();
        let refresh = create_refresh_token(user_id, "student", &config).unwrap();

        assert!(verify_token(&access, TokenKind::Access, &config).is_ok());
        assert!(verify_token(&refresh, TokenKind::Refresh, &config).is_ok());
    }
}
