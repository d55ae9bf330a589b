use axum::{
    Json,
    extract::{FromRequest, Multipart, Request, State},
    http::{StatusCode, header::CONTENT_TYPE},
};
use axum_extra::extract::cookie::CookieJar;
use tracing::instrument;
use utoipa::ToSchema;
use validator::Validate;

use kurs_core::{ApiResponse, AppError, NoData};
use kurs_models::auth::{
    AccessTokenPayload, ForgotPasswordRequest, LoginRequest, RegisterRequest,
    ResetPasswordRequest, SessionPayload,
};

use crate::docs::{ErrorResponse, MessageResponse};
use crate::state::AppState;
use crate::utils::cookies::{REFRESH_TOKEN_COOKIE, clear_session, with_access_token, with_session};
use crate::utils::upload::{ImageUpload, INVALID_FORM_MESSAGE, MultipartForm};
use crate::validator::{INVALID_FIELD_TYPE_MESSAGE, ValidatedJson};

use super::service::{AuthService, AuthSession};

pub const REGISTERED_MESSAGE: &str = "Foydalanuvchi muvaffaqiyatli ro'yxatdan o'tdi";
pub const LOGGED_IN_MESSAGE: &str = "Tizimga muvaffaqiyatli kirdingiz";
pub const TOKEN_REFRESHED_MESSAGE: &str = "Access token yangilandi";
pub const LOGGED_OUT_MESSAGE: &str = "Tizimdan chiqdingiz";
pub const RESET_CODE_SENT_MESSAGE: &str = "Parolni tiklash kodi emailingizga yuborildi";
pub const PASSWORD_RESET_MESSAGE: &str = "Parol muvaffaqiyatli yangilandi";

fn session_response(
    jar: CookieJar,
    session: AuthSession,
    state: &AppState,
    message: &str,
) -> (CookieJar, Json<ApiResponse<SessionPayload>>) {
    let jar = with_session(
        jar,
        session.access_token.clone(),
        session.refresh_token,
        &state.jwt_config,
    );
    let body = ApiResponse::with_message(
        message,
        SessionPayload {
            access_token: session.access_token,
            user: session.user,
        },
    );
    (jar, Json(body))
}

/// Multipart variant of the registration body, with an optional avatar.
#[allow(dead_code)]
#[derive(ToSchema)]
#[schema(rename_all = "camelCase")]
pub struct RegisterMultipart {
    pub user_name: Option<String>,
    pub email: Option<String>,
    pub password: Option<String>,
    /// Digits only
    pub tel: Option<String>,
    /// JPEG, PNG or WEBP, at most 3 MB
    #[schema(value_type = Option<String>, format = Binary)]
    pub image: Option<Vec<u8>>,
}

fn is_multipart(request: &Request) -> bool {
    request
        .headers()
        .get(CONTENT_TYPE)
        .and_then(|value| value.to_str().ok())
        .is_some_and(|value| value.starts_with("multipart/form-data"))
}

/// Reads the registration body from JSON or from a multipart form.
async fn read_registration(
    request: Request,
    state: &AppState,
) -> Result<(RegisterRequest, Option<ImageUpload>), AppError> {
    if !is_multipart(&request) {
        let ValidatedJson(dto) = ValidatedJson::<RegisterRequest>::from_request(request, state).await?;
        return Ok((dto, None));
    }

    let mut multipart = Multipart::from_request(request, state)
        .await
        .map_err(|rejection| {
            tracing::debug!(error = %rejection.body_text(), "Rejected multipart body");
            AppError::bad_request(INVALID_FORM_MESSAGE)
        })?;
    let form = MultipartForm::read(&mut multipart, &["userName", "email", "password", "tel"]).await?;

    let tel = match form.text("tel").map(|tel| tel.trim().to_string()) {
        Some(tel) if !tel.is_empty() => Some(
            tel.parse::<i64>()
                .map_err(|_| AppError::bad_request(INVALID_FIELD_TYPE_MESSAGE))?,
        ),
        _ => None,
    };
    let dto = RegisterRequest {
        user_name: form.text("userName"),
        email: form.text("email"),
        password: form.text("password"),
        tel,
    };
    dto.validate().map_err(|errors| AppError::validation(&errors))?;

    Ok((dto, form.image))
}

/// Register a new student account
#[utoipa::path(
    post,
    path = "/user/register",
    request_body(content(
        (RegisterRequest = "application/json"),
        (RegisterMultipart = "multipart/form-data")
    )),
    responses(
        (status = 201, description = "User registered, session cookies set", body = SessionPayload),
        (status = 400, description = "Missing field or validation error", body = ErrorResponse),
        (status = 409, description = "Email already registered", body = ErrorResponse)
    ),
    tag = "Authentication"
)]
#[instrument(skip(state, jar, request))]
pub async fn register_user(
    State(state): State<AppState>,
    jar: CookieJar,
    request: Request,
) -> Result<(StatusCode, CookieJar, Json<ApiResponse<SessionPayload>>), AppError> {
    let (dto, image) = read_registration(request, &state).await?;
    let session = AuthService::register_user(&state, dto, image).await?;
    let (jar, body) = session_response(jar, session, &state, REGISTERED_MESSAGE);
    Ok((StatusCode::CREATED, jar, body))
}

/// Log in with email and password
#[utoipa::path(
    post,
    path = "/user/login",
    request_body = LoginRequest,
    responses(
        (status = 200, description = "Logged in, session cookies set", body = SessionPayload),
        (status = 400, description = "Missing credentials or wrong password", body = ErrorResponse),
        (status = 404, description = "Unknown email", body = ErrorResponse)
    ),
    tag = "Authentication"
)]
#[instrument(skip(state, jar, dto))]
pub async fn login_user(
    State(state): State<AppState>,
    jar: CookieJar,
    ValidatedJson(dto): ValidatedJson<LoginRequest>,
) -> Result<(CookieJar, Json<ApiResponse<SessionPayload>>), AppError> {
    let session = AuthService::login_user(&state, dto).await?;
    Ok(session_response(jar, session, &state, LOGGED_IN_MESSAGE))
}

/// Issue a new access token from the `refreshToken` cookie
#[utoipa::path(
    post,
    path = "/user/refresh-token",
    responses(
        (status = 200, description = "New access cookie set", body = AccessTokenPayload),
        (status = 403, description = "Refresh token missing, invalid or expired", body = ErrorResponse),
        (status = 404, description = "User no longer exists", body = ErrorResponse)
    ),
    tag = "Authentication"
)]
#[instrument(skip(state, jar))]
pub async fn refresh_token(
    State(state): State<AppState>,
    jar: CookieJar,
) -> Result<(CookieJar, Json<ApiResponse<AccessTokenPayload>>), AppError> {
    let refresh_token = jar
        .get(REFRESH_TOKEN_COOKIE)
        .map(|cookie| cookie.value().to_string());
    let access_token = AuthService::refresh_access_token(&state, refresh_token).await?;

    let jar = with_access_token(jar, access_token.clone(), &state.jwt_config);
    Ok((
        jar,
        Json(ApiResponse::with_message(
            TOKEN_REFRESHED_MESSAGE,
            AccessTokenPayload { access_token },
        )),
    ))
}

/// Clear both session cookies
#[utoipa::path(
    post,
    path = "/user/logout",
    responses(
        (status = 200, description = "Cookies cleared", body = MessageResponse)
    ),
    tag = "Authentication"
)]
#[instrument(skip(jar))]
pub async fn logout_user(jar: CookieJar) -> (CookieJar, Json<ApiResponse<NoData>>) {
    (clear_session(jar), Json(ApiResponse::message(LOGGED_OUT_MESSAGE)))
}

/// Email a six-digit reset code, valid for three minutes
#[utoipa::path(
    post,
    path = "/user/forgot-password",
    request_body = ForgotPasswordRequest,
    responses(
        (status = 200, description = "Code sent", body = MessageResponse),
        (status = 400, description = "Email missing or malformed", body = ErrorResponse),
        (status = 404, description = "No user with this email", body = ErrorResponse),
        (status = 500, description = "Email could not be sent", body = ErrorResponse)
    ),
    tag = "Authentication"
)]
#[instrument(skip(state, dto))]
pub async fn forgot_password(
    State(state): State<AppState>,
    ValidatedJson(dto): ValidatedJson<ForgotPasswordRequest>,
) -> Result<Json<ApiResponse<NoData>>, AppError> {
    AuthService::forgot_password(&state, dto).await?;
    Ok(Json(ApiResponse::message(RESET_CODE_SENT_MESSAGE)))
}

/// Set a new password using the emailed code
#[utoipa::path(
    post,
    path = "/user/reset-password",
    request_body = ResetPasswordRequest,
    responses(
        (status = 200, description = "Password changed", body = MessageResponse),
        (status = 400, description = "Missing field, weak password, or wrong or expired code", body = ErrorResponse)
    ),
    tag = "Authentication"
)]
#[instrument(skip(state, dto))]
pub async fn reset_password(
    State(state): State<AppState>,
    ValidatedJson(dto): ValidatedJson<ResetPasswordRequest>,
) -> Result<Json<ApiResponse<NoData>>, AppError> {
    AuthService::reset_password(&state, dto).await?;
    Ok(Json(ApiResponse::message(PASSWORD_RESET_MESSAGE)))
}
