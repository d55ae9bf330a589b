//! Role-based authorization.
//!
//! [`require_admin`] is layered inside [`authenticate`](super::auth::authenticate)
//! on admin-only routes:
//!
//! ```rust,ignore
//! Router::new()
//!     .route("/add-category", post(add_category))
//!     .route_layer(middleware::from_fn(require_admin))
//!     .route_layer(middleware::from_fn_with_state(state, authenticate));
//! ```

use axum::{extract::Request, middleware::Next, response::Response};

use kurs_core::AppError;
use kurs_models::users::UserRole;

use crate::middleware::auth::{AuthUser, RequestContext, TOKEN_MISSING_MESSAGE};

pub const ADMIN_ONLY_MESSAGE: &str = "Faqat adminlar uchun ruxsat berilgan";
pub const ACCESS_DENIED_MESSAGE: &str = "Ruxsat berilmagan";

/// Rejects with 401 when no identity was attached, 403 when the caller is
/// not an admin.
pub async fn require_admin(req: Request, next: Next) -> Result<Response, AppError> {
    let Some(auth_user) = RequestContext::of(req.extensions()).user().cloned() else {
        return Err(AppError::unauthorized(TOKEN_MISSING_MESSAGE));
    };

    check_role(&auth_user, UserRole::Admin)?;
    Ok(next.run(req).await)
}

pub fn check_role(auth_user: &AuthUser, required_role: UserRole) -> Result<(), AppError> {
    if auth_user.role() == required_role {
        return Ok(());
    }

    tracing::warn!(
        security.event = "access_denied",
        user.id = %auth_user.id(),
        user.role = %auth_user.role(),
        "Role check failed"
    );

    match required_role {
        UserRole::Admin => Err(AppError::forbidden(ADMIN_ONLY_MESSAGE)),
        UserRole::Student => Err(AppError::forbidden(ACCESS_DENIED_MESSAGE)),
    }
}
