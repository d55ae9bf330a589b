//! # Kurs Auth
//!
//! Credentials that are not passwords:
//!
//! - [`claims`]: JWT claims shared by access and refresh tokens
//! - [`jwt`]: Token creation and verification
//! - [`reset_code`]: One-time numeric password-reset codes
//!
//! Access and refresh tokens are signed with different secrets and carry a
//! `kind` claim, so one can never be accepted in place of the other.
//!
//! # Example
//!
//! ```ignore
//! use kurs_auth::{TokenKind, create_access_token, verify_token};
//! use kurs_config::JwtConfig;
//!
//! let config = JwtConfig::from_env();
//! let token = create_access_token(user_id, "student", &config)?;
//! let claims = verify_token(&token, TokenKind::Access, &config)?;
//! ```

pub mod claims;
pub mod jwt;
pub mod reset_code;

pub use claims::{Claims, TokenKind};
pub use jwt::{
    TokenError, create_access_token, create_refresh_token, create_token_at, verify_token,
    verify_token_at,
};
pub use reset_code::ResetCode;
