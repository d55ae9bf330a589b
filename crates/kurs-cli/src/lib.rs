//! # Kurs CLI
//!
//! Administration and seeding utilities used by the `kurs-cli` binary.
//!
//! - [`admin`]: creates admin accounts. Registration over HTTP always
//!   yields students, so the first admin must come from here.
//! - [`seeder`]: fills the database with fake categories, courses and
//!   students for development.
//!
//! ## Usage
//!
//! ```ignore
//! use kurs_cli::seeder::{seed_all, SeedConfig};
//!
//! seed_all(&pool, SeedConfig::new(5)).await?;
//! ```

pub mod admin;
pub mod seeder;
