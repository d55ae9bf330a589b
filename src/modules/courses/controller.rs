use axum::{
    Json,
    extract::{Path, State},
    http::StatusCode,
};
use tracing::instrument;

use kurs_core::ids::parse_id;
use kurs_core::{ApiResponse, AppError, NoData};
use kurs_models::courses::{CoursePayload, CourseRequest, CoursesPayload};

use crate::docs::{ErrorResponse, MessageResponse};
use crate::middleware::auth::AuthUser;
use crate::state::AppState;
use crate::validator::ValidatedJson;

use super::service::{CourseService, INVALID_COURSE_ID_MESSAGE};

pub const COURSE_CREATED_MESSAGE: &str = "Kurs muvaffaqiyatli qo'shildi";
pub const COURSE_UPDATED_MESSAGE: &str = "Kurs muvaffaqiyatli yangilandi";
pub const COURSE_DELETED_MESSAGE: &str = "Kurs muvaffaqiyatli o'chirildi";
pub const ENROLLED_MESSAGE: &str = "Kursga muvaffaqiyatli yozildingiz";

/// Create a course (starts as `pending`)
#[utoipa::path(
    post,
    path = "/kurs/add-kurs",
    request_body = CourseRequest,
    responses(
        (status = 201, description = "Course created", body = CoursePayload),
        (status = 400, description = "Missing field, negative amount or malformed category ID", body = ErrorResponse),
        (status = 404, description = "Category not found", body = ErrorResponse),
        (status = 409, description = "Title already taken", body = ErrorResponse)
    ),
    tag = "Courses",
    security(("cookie_auth" = []))
)]
#[instrument(skip(state))]
pub async fn add_course(
    State(state): State<AppState>,
    ValidatedJson(dto): ValidatedJson<CourseRequest>,
) -> Result<(StatusCode, Json<ApiResponse<CoursePayload>>), AppError> {
    let kurs = CourseService::create_course(&state, dto).await?;
    Ok((
        StatusCode::CREATED,
        Json(ApiResponse::with_message(
            COURSE_CREATED_MESSAGE,
            CoursePayload { kurs },
        )),
    ))
}

/// List every course with its category and students
#[utoipa::path(
    get,
    path = "/kurs/kurslar",
    responses(
        (status = 200, description = "All courses, populated", body = CoursesPayload),
        (status = 404, description = "No courses yet", body = ErrorResponse)
    ),
    tag = "Courses"
)]
#[instrument(skip(state))]
pub async fn get_courses(
    State(state): State<AppState>,
) -> Result<Json<ApiResponse<CoursesPayload>>, AppError> {
    let kurslar = CourseService::get_courses(&state).await?;
    Ok(Json(ApiResponse::ok(CoursesPayload { kurslar })))
}

/// Update a course
#[utoipa::path(
    put,
    path = "/kurs/update-kurs/{id}",
    params(("id" = String, Path, description = "Course ID")),
    request_body = CourseRequest,
    responses(
        (status = 200, description = "Course updated", body = CoursePayload),
        (status = 400, description = "Malformed ID or negative amount", body = ErrorResponse),
        (status = 404, description = "Course or category not found", body = ErrorResponse),
        (status = 409, description = "Title already taken", body = ErrorResponse)
    ),
    tag = "Courses",
    security(("cookie_auth" = []))
)]
#[instrument(skip(state))]
pub async fn update_course(
    State(state): State<AppState>,
    Path(id): Path<String>,
    ValidatedJson(dto): ValidatedJson<CourseRequest>,
) -> Result<Json<ApiResponse<CoursePayload>>, AppError> {
    let id = parse_id(&id, INVALID_COURSE_ID_MESSAGE)?;
    let kurs = CourseService::update_course(&state, id, dto).await?;
    Ok(Json(ApiResponse::with_message(
        COURSE_UPDATED_MESSAGE,
        CoursePayload { kurs },
    )))
}

/// Delete a course
#[utoipa::path(
    delete,
    path = "/kurs/delete-kurs/{id}",
    params(("id" = String, Path, description = "Course ID")),
    responses(
        (status = 200, description = "Course deleted", body = MessageResponse),
        (status = 400, description = "Malformed ID", body = ErrorResponse),
        (status = 404, description = "Course not found", body = ErrorResponse)
    ),
    tag = "Courses",
    security(("cookie_auth" = []))
)]
#[instrument(skip(state))]
pub async fn delete_course(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<ApiResponse<NoData>>, AppError> {
    let id = parse_id(&id, INVALID_COURSE_ID_MESSAGE)?;
    CourseService::delete_course(&state, id).await?;
    Ok(Json(ApiResponse::message(COURSE_DELETED_MESSAGE)))
}

/// Enroll the authenticated user in an active course
#[utoipa::path(
    post,
    path = "/kurs/{id}/enroll",
    params(("id" = String, Path, description = "Course ID")),
    responses(
        (status = 200, description = "Enrolled", body = CoursePayload),
        (status = 400, description = "Malformed ID or course not approved yet", body = ErrorResponse),
        (status = 401, description = "Not authenticated", body = ErrorResponse),
        (status = 404, description = "Course not found", body = ErrorResponse)
    ),
    tag = "Courses",
    security(("cookie_auth" = []))
)]
#[instrument(skip(state, auth_user), fields(user.id = %auth_user.id()))]
pub async fn enroll_course(
    State(state): State<AppState>,
    auth_user: AuthUser,
    Path(id): Path<String>,
) -> Result<Json<ApiResponse<CoursePayload>>, AppError> {
    let id = parse_id(&id, INVALID_COURSE_ID_MESSAGE)?;
    let kurs = CourseService::enroll(&state, id, auth_user.id()).await?;
    Ok(Json(ApiResponse::with_message(
        ENROLLED_MESSAGE,
        CoursePayload { kurs },
    )))
}
