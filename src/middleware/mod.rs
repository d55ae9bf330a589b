//! Authentication and authorization.
//!
//! - [`auth`]: the `authenticate` layer, [`auth::RequestContext`] and the
//!   [`auth::AuthUser`] extractor
//! - [`role`]: the `require_admin` layer and role checks
//!
//! # Flow
//!
//! 1. Client sends the `accessToken` cookie set at login
//! 2. `authenticate` verifies it, loads the user and attaches the identity
//! 3. `require_admin` (admin routes only) checks the role
//! 4. The handler runs with an `AuthUser`

pub mod auth;
pub mod role;
