use axum::{
    Json,
    extract::{
        State,
        multipart::{Multipart, MultipartRejection},
    },
};
use tracing::instrument;
use utoipa::ToSchema;

use kurs_core::{ApiResponse, AppError};
use kurs_models::auth::UserPayload;

use crate::docs::ErrorResponse;
use crate::middleware::auth::AuthUser;
use crate::state::AppState;
use crate::utils::upload::{INVALID_FORM_MESSAGE, MultipartForm};

use super::service::{UpdateUserForm, UserService};

pub const USER_UPDATED_MESSAGE: &str = "Foydalanuvchi ma'lumotlari muvaffaqiyatli yangilandi";

/// Multipart body of `PUT /user/update-user`. Every part is optional.
#[allow(dead_code)]
#[derive(ToSchema)]
#[schema(rename_all = "camelCase")]
pub struct UpdateUserMultipart {
    pub user_name: Option<String>,
    /// Current password, required together with `newPassword`
    pub password: Option<String>,
    pub new_password: Option<String>,
    /// JPEG, PNG or WEBP, at most 3 MB
    #[schema(value_type = Option<String>, format = Binary)]
    pub image: Option<Vec<u8>>,
}

/// Get the authenticated user
#[utoipa::path(
    get,
    path = "/user/profile",
    responses(
        (status = 200, description = "Current user", body = UserPayload),
        (status = 401, description = "Not authenticated", body = ErrorResponse),
        (status = 404, description = "User no longer exists", body = ErrorResponse)
    ),
    tag = "Users",
    security(("cookie_auth" = []))
)]
#[instrument(skip(state, auth_user), fields(user.id = %auth_user.id()))]
pub async fn get_profile(
    State(state): State<AppState>,
    auth_user: AuthUser,
) -> Result<Json<ApiResponse<UserPayload>>, AppError> {
    let user = UserService::get_profile(&state, auth_user.id()).await?;
    Ok(Json(ApiResponse::ok(UserPayload { user })))
}

/// Update name, password or avatar of the authenticated user
#[utoipa::path(
    put,
    path = "/user/update-user",
    request_body(content = UpdateUserMultipart, content_type = "multipart/form-data"),
    responses(
        (status = 200, description = "User updated", body = UserPayload),
        (status = 400, description = "Invalid form, image or new password", body = ErrorResponse),
        (status = 401, description = "Old password missing or wrong", body = ErrorResponse)
    ),
    tag = "Users",
    security(("cookie_auth" = []))
)]
#[instrument(skip(state, auth_user, multipart), fields(user.id = %auth_user.id()))]
pub async fn update_user(
    State(state): State<AppState>,
    auth_user: AuthUser,
    multipart: Result<Multipart, MultipartRejection>,
) -> Result<Json<ApiResponse<UserPayload>>, AppError> {
    let mut multipart = multipart.map_err(|rejection| {
        tracing::debug!(error = %rejection.body_text(), "Rejected multipart body");
        AppError::bad_request(INVALID_FORM_MESSAGE)
    })?;

    let form = MultipartForm::read(&mut multipart, &["userName", "password", "newPassword"]).await?;
    let form = UpdateUserForm {
        user_name: form.text("userName"),
        password: form.text("password"),
        new_password: form.text("newPassword"),
        image: form.image,
    };
    let user = UserService::update_user(&state, auth_user.id(), form).await?;

    Ok(Json(ApiResponse::with_message(
        USER_UPDATED_MESSAGE,
        UserPayload { user },
    )))
}
