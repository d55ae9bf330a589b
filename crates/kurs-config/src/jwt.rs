use std::env;

/// Token secrets and lifetimes. Access and refresh tokens are signed with
/// different secrets.
#[derive(Clone, Debug)]
pub struct JwtConfig {
    pub access_secret: String,
    pub refresh_secret: String,
    /// Seconds.
    pub access_token_expiry: i64,
    /// Seconds.
    pub refresh_token_expiry: i64,
    /// Sets the `Secure` flag on session cookies.
    pub secure_cookies: bool,
}

impl JwtConfig {
    pub fn from_env() -> Self {
        Self {
            access_secret: env::var("JWT_ACCESS_TOKEN")
                .unwrap_or_else(|_| "access-secret-change-in-production".to_string()),
            refresh_secret: env::var("JWT_REFRESH_TOKEN")
                .unwrap_or_else(|_| "refresh-secret-change-in-production".to_string()),
            access_token_expiry: env::var("JWT_ACCESS_EXPIRY")
                .ok()
                .and_then(|s| s.parse().ok())
                .unwrap_or(3600), // 1 hour
            refresh_token_expiry: env::var("JWT_REFRESH_EXPIRY")
                .ok()
                .and_then(|s| s.parse().ok())
                .unwrap_or(86400), // 24 hours
            secure_cookies: env::var("COOKIE_SECURE")
                .map(|v| v.to_lowercase() == "true" || v == "1")
                .unwrap_or(false),
        }
    }
}
