use axum::{
    Json,
    extract::{Path, State},
};
use tracing::instrument;

use kurs_core::ids::parse_id;
use kurs_core::{ApiResponse, AppError, NoData};
use kurs_models::admin::{AnalyticsPayload, UpdateRoleRequest, UsersPayload};
use kurs_models::auth::UserPayload;
use kurs_models::courses::CourseDetailsPayload;

use crate::docs::{ErrorResponse, MessageResponse};
use crate::modules::courses::service::INVALID_COURSE_ID_MESSAGE;
use crate::state::AppState;
use crate::validator::ValidatedJson;

use super::service::{AdminService, INVALID_USER_ID_MESSAGE};

pub const ROLE_UPDATED_MESSAGE: &str = "Foydalanuvchi roli yangilandi";
pub const USER_DELETED_MESSAGE: &str = "Foydalanuvchi muvaffaqiyatli o'chirildi";
pub const COURSE_APPROVED_MESSAGE: &str = "Kurs tasdiqlandi";

/// List every user
#[utoipa::path(
    get,
    path = "/admin/users",
    responses(
        (status = 200, description = "All users", body = UsersPayload),
        (status = 403, description = "Admins only", body = ErrorResponse),
        (status = 404, description = "No users", body = ErrorResponse)
    ),
    tag = "Admin",
    security(("cookie_auth" = []))
)]
#[instrument(skip(state))]
pub async fn get_users(
    State(state): State<AppState>,
) -> Result<Json<ApiResponse<UsersPayload>>, AppError> {
    let users = AdminService::get_users(&state).await?;
    Ok(Json(ApiResponse::ok(UsersPayload { users })))
}

/// Change a user's role
#[utoipa::path(
    put,
    path = "/admin/users/{id}/role",
    params(("id" = String, Path, description = "User ID")),
    request_body = UpdateRoleRequest,
    responses(
        (status = 200, description = "Role updated", body = UserPayload),
        (status = 400, description = "Malformed ID or unknown role", body = ErrorResponse),
        (status = 404, description = "User not found", body = ErrorResponse)
    ),
    tag = "Admin",
    security(("cookie_auth" = []))
)]
#[instrument(skip(state))]
pub async fn update_user_role(
    State(state): State<AppState>,
    Path(id): Path<String>,
    ValidatedJson(dto): ValidatedJson<UpdateRoleRequest>,
) -> Result<Json<ApiResponse<UserPayload>>, AppError> {
    let id = parse_id(&id, INVALID_USER_ID_MESSAGE)?;
    let user = AdminService::update_role(&state, id, dto.role).await?;
    Ok(Json(ApiResponse::with_message(
        ROLE_UPDATED_MESSAGE,
        UserPayload { user },
    )))
}

/// Delete a user and pull them from every course
#[utoipa::path(
    delete,
    path = "/admin/users/{id}",
    params(("id" = String, Path, description = "User ID")),
    responses(
        (status = 200, description = "User deleted", body = MessageResponse),
        (status = 400, description = "Malformed ID", body = ErrorResponse),
        (status = 404, description = "User not found", body = ErrorResponse)
    ),
    tag = "Admin",
    security(("cookie_auth" = []))
)]
#[instrument(skip(state))]
pub async fn delete_user(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<ApiResponse<NoData>>, AppError> {
    let id = parse_id(&id, INVALID_USER_ID_MESSAGE)?;
    AdminService::delete_user(&state, id).await?;
    Ok(Json(ApiResponse::message(USER_DELETED_MESSAGE)))
}

/// Approve a pending course
#[utoipa::path(
    put,
    path = "/admin/kurs/{id}/approve",
    params(("id" = String, Path, description = "Course ID")),
    responses(
        (status = 200, description = "Course is now active", body = CourseDetailsPayload),
        (status = 400, description = "Malformed ID", body = ErrorResponse),
        (status = 404, description = "Course not found", body = ErrorResponse)
    ),
    tag = "Admin",
    security(("cookie_auth" = []))
)]
#[instrument(skip(state))]
pub async fn approve_course(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<ApiResponse<CourseDetailsPayload>>, AppError> {
    let id = parse_id(&id, INVALID_COURSE_ID_MESSAGE)?;
    let data = AdminService::approve_course(&state, id).await?;
    Ok(Json(ApiResponse::with_message(
        COURSE_APPROVED_MESSAGE,
        CourseDetailsPayload { data },
    )))
}

/// User and course totals plus the five most popular courses
#[utoipa::path(
    get,
    path = "/admin/analytics",
    responses(
        (status = 200, description = "Analytics", body = AnalyticsPayload),
        (status = 403, description = "Admins only", body = ErrorResponse)
    ),
    tag = "Admin",
    security(("cookie_auth" = []))
)]
#[instrument(skip(state))]
pub async fn get_analytics(
    State(state): State<AppState>,
) -> Result<Json<ApiResponse<AnalyticsPayload>>, AppError> {
    let data = AdminService::analytics(&state).await?;
    Ok(Json(ApiResponse::ok(AnalyticsPayload { data })))
}
