//! # Kurs API
//!
//! Course enrollment backend built with Axum and PostgreSQL. Students
//! register, log in with cookie sessions and enroll in approved courses;
//! admins manage categories, courses and users.
//!
//! ## Architecture
//!
//! ```text
//! src/
//! ├── middleware/     # authenticate + require_admin layers
//! ├── modules/        # Feature modules
//! │   ├── auth/       # register, login, refresh, logout, password reset
//! │   ├── users/      # profile, update-user, credential store
//! │   ├── categories/ # category CRUD
//! │   ├── courses/    # course CRUD and enrollment
//! │   └── admin/      # user management, approval, analytics
//! ├── store/          # persistence traits, Postgres and in-memory stores
//! └── utils/          # cookies, email, avatar uploads
//! ```
//!
//! Each feature module has a `controller.rs` (handlers), `service.rs`
//! (business rules) and `router.rs`. Shared types live in the workspace
//! crates:
//!
//! - `kurs-core`: `AppError`, response envelope, password hashing, file storage
//! - `kurs-config`: environment-driven configuration
//! - `kurs-auth`: JWT access/refresh tokens and reset codes
//! - `kurs-db`: connection pool and migrations
//! - `kurs-models`: domain models and DTOs
//!
//! ## Sessions
//!
//! Login and register set two http-only, SameSite=Strict cookies:
//! `accessToken` (1 hour) and `refreshToken` (24 hours). They are signed
//! with different secrets and carry a `kind` claim, so neither is accepted
//! in place of the other. `POST /user/refresh-token` issues a new access
//! cookie.
//!
//! ## Roles
//!
//! Registration always creates a `student`. The first `admin` is created
//! with `kurs-cli create-admin`; admins can then promote other users.

pub mod docs;
pub mod logging;
pub mod middleware;
pub mod modules;
pub mod router;
pub mod state;
pub mod store;
pub mod utils;
pub mod validator;
