//! # Kurs Config
//!
//! Configuration types for the Kurs API, loaded from environment variables
//! (a `.env` file is read by the binaries before these are built).
//!
//! - [`jwt`]: access/refresh token secrets, lifetimes and cookie flags
//! - [`cors`]: CORS allowed origins
//! - [`email`]: SMTP configuration
//! - [`upload`]: avatar upload directory and limits
//! - [`server`]: bind address
//!
//! # Example
//!
//! ```ignore
//! use kurs_config::{CorsConfig, EmailConfig, JwtConfig};
//!
//! let jwt_config = JwtConfig::from_env();
//! let cors_config = CorsConfig::from_env();
//! let email_config = EmailConfig::from_env();
//! ```

pub mod cors;
pub mod email;
pub mod jwt;
pub mod server;
pub mod upload;

pub use cors::CorsConfig;
pub use email::EmailConfig;
pub use jwt::JwtConfig;
pub use server::ServerConfig;
pub use upload::UploadConfig;
