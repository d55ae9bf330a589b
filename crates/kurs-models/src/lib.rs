//! # Kurs Models
//!
//! Domain models, store inputs and request/response DTOs.
//!
//! - [`users`]: users, roles and the public user projection
//! - [`auth`]: registration, login and password-reset DTOs
//! - [`categories`]: course categories
//! - [`courses`]: courses ("kurslar"), enrollment and popularity
//! - [`admin`]: admin-only DTOs and analytics
//!
//! [`users::UserRecord`] carries the password hash and reset code, so it never
//! derives `Serialize`; responses use [`users::User`] instead.

pub mod admin;
pub mod auth;
pub mod categories;
pub mod courses;
pub mod users;
