//! Cookie-based authentication.
//!
//! [`authenticate`] runs as a route layer: it reads the `accessToken`
//! cookie, verifies it, loads the user and stores the outcome in the request
//! extensions as a [`RequestContext`]. Handlers then take an [`AuthUser`].

use axum::{
    extract::{FromRequestParts, Request, State},
    http::{Extensions, request::Parts},
    middleware::Next,
    response::{IntoResponse, Response},
};
use axum_extra::extract::cookie::CookieJar;
use uuid::Uuid;

use kurs_auth::{TokenError, TokenKind, verify_token};
use kurs_core::AppError;
use kurs_models::users::{User, UserRole};

use crate::state::AppState;
use crate::utils::cookies::{ACCESS_TOKEN_COOKIE, clear_access_token};

pub const TOKEN_MISSING_MESSAGE: &str = "Avtorizatsiyadan o'tilmagan, token topilmadi";
pub const TOKEN_EXPIRED_MESSAGE: &str = "Token muddati tugagan.";
pub const TOKEN_INVALID_MESSAGE: &str = "Yaroqsiz token";
pub const USER_NOT_FOUND_MESSAGE: &str = "Foydalanuvchi topilmadi";

/// The caller, as loaded from the store. Never carries the password hash.
#[derive(Debug, Clone)]
pub struct AuthUser(pub User);

impl AuthUser {
    pub fn id(&self) -> Uuid {
        self.0.id
    }

    pub fn role(&self) -> UserRole {
        self.0.role
    }
}

/// Outcome of authentication for the current request.
#[derive(Debug, Clone, Default)]
pub enum RequestContext {
    #[default]
    Unauthenticated,
    Authenticated(AuthUser),
}

impl RequestContext {
    pub fn of(extensions: &Extensions) -> Self {
        extensions.get::<RequestContext>().cloned().unwrap_or_default()
    }

    pub fn user(&self) -> Option<&AuthUser> {
        match self {
            RequestContext::Authenticated(user) => Some(user),
            RequestContext::Unauthenticated => None,
        }
    }
}

pub async fn authenticate(
    State(state): State<AppState>,
    jar: CookieJar,
    mut req: Request,
    next: Next,
) -> Response {
    let Some(token) = jar.get(ACCESS_TOKEN_COOKIE).map(|c| c.value().to_string()) else {
        return AppError::unauthorized(TOKEN_MISSING_MESSAGE).into_response();
    };

    let claims = match verify_token(&token, TokenKind::Access, &state.jwt_config) {
        Ok(claims) => claims,
        Err(TokenError::Expired) => {
            tracing::info!("Access token expired, clearing cookie");
            return (
                clear_access_token(jar),
                AppError::unauthorized(TOKEN_EXPIRED_MESSAGE),
            )
                .into_response();
        }
        Err(TokenError::Invalid) => {
            tracing::warn!(security.event = "invalid_access_token", "Rejected access token");
            return AppError::unauthorized(TOKEN_INVALID_MESSAGE).into_response();
        }
    };

    let Some(user_id) = claims.user_id() else {
        return AppError::unauthorized(TOKEN_INVALID_MESSAGE).into_response();
    };

    let user = match state.users.find_by_id(user_id).await {
        Ok(Some(record)) => User::from(record),
        Ok(None) => return AppError::not_found(USER_NOT_FOUND_MESSAGE).into_response(),
        Err(err) => return err.into_response(),
    };

    tracing::debug!(user.id = %user.id, user.role = %user.role, "Request authenticated");
    req.extensions_mut()
        .insert(RequestContext::Authenticated(AuthUser(user)));
    next.run(req).await
}

impl<S> FromRequestParts<S> for AuthUser
where
    S: Send + Sync,
{
    type Rejection = AppError;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        match RequestContext::of(&parts.extensions) {
            RequestContext::Authenticated(user) => Ok(user),
            RequestContext::Unauthenticated => Err(AppError::unauthorized(TOKEN_MISSING_MESSAGE)),
        }
    }
}
