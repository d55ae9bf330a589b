//! # Kurs Core
//!
//! Core types, errors, and utilities for the Kurs API.
//!
//! - [`errors`]: Application error type with HTTP response conversion
//! - [`password`]: bcrypt hashing, verification and the password policy
//! - [`response`]: The `{ success, message, ...payload }` response envelope
//! - [`file_storage`]: Blob storage abstraction for uploaded files
//! - [`ids`]: Path identifier parsing
//!
//! # Example
//!
//! ```ignore
//! use kurs_core::errors::AppError;
//! use kurs_core::password::{hash_password, verify_password};
//!
//! let error = AppError::not_found("Foydalanuvchi topilmadi");
//! let hash = hash_password("Secret#1pass")?;
//! ```

pub mod errors;
pub mod file_storage;
pub mod ids;
pub mod password;
pub mod response;

pub use errors::AppError;
pub use password::{hash_password, verify_password};
pub use response::{ApiResponse, NoData};
