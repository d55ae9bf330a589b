use axum::{
    Json,
    extract::{Path, State},
    http::StatusCode,
};
use tracing::instrument;

use kurs_core::ids::parse_id;
use kurs_core::{ApiResponse, AppError, NoData};
use kurs_models::categories::{CategoriesPayload, CategoryPayload, CategoryRequest};

use crate::docs::{ErrorResponse, MessageResponse};
use crate::state::AppState;
use crate::validator::ValidatedJson;

use super::service::{CategoryService, INVALID_CATEGORY_ID_MESSAGE};

pub const CATEGORY_CREATED_MESSAGE: &str = "Kategoriya muvaffaqiyatli qo'shildi";
pub const CATEGORY_UPDATED_MESSAGE: &str = "Kategoriya muvaffaqiyatli yangilandi";
pub const CATEGORY_DELETED_MESSAGE: &str = "Kategoriya muvaffaqiyatli o'chirildi";

/// Create a category
#[utoipa::path(
    post,
    path = "/category/add-category",
    request_body = CategoryRequest,
    responses(
        (status = 201, description = "Category created", body = CategoryPayload),
        (status = 400, description = "Name missing or too long", body = ErrorResponse),
        (status = 403, description = "Admins only", body = ErrorResponse),
        (status = 409, description = "Name already taken", body = ErrorResponse)
    ),
    tag = "Categories",
    security(("cookie_auth" = []))
)]
#[instrument(skip(state))]
pub async fn add_category(
    State(state): State<AppState>,
    ValidatedJson(dto): ValidatedJson<CategoryRequest>,
) -> Result<(StatusCode, Json<ApiResponse<CategoryPayload>>), AppError> {
    let category = CategoryService::create_category(state.categories.as_ref(), dto).await?;
    Ok((
        StatusCode::CREATED,
        Json(ApiResponse::with_message(
            CATEGORY_CREATED_MESSAGE,
            CategoryPayload { category },
        )),
    ))
}

/// List every category
#[utoipa::path(
    get,
    path = "/category/categories",
    responses(
        (status = 200, description = "All categories", body = CategoriesPayload)
    ),
    tag = "Categories"
)]
#[instrument(skip(state))]
pub async fn get_categories(
    State(state): State<AppState>,
) -> Result<Json<ApiResponse<CategoriesPayload>>, AppError> {
    let categories = CategoryService::get_categories(state.categories.as_ref()).await?;
    Ok(Json(ApiResponse::ok(CategoriesPayload { categories })))
}

/// Update name or description of a category
#[utoipa::path(
    put,
    path = "/category/update-category/{id}",
    params(("id" = String, Path, description = "Category ID")),
    request_body = CategoryRequest,
    responses(
        (status = 200, description = "Category updated", body = CategoryPayload),
        (status = 400, description = "Malformed ID or invalid field", body = ErrorResponse),
        (status = 404, description = "Category not found", body = ErrorResponse),
        (status = 409, description = "Name already taken", body = ErrorResponse)
    ),
    tag = "Categories",
    security(("cookie_auth" = []))
)]
#[instrument(skip(state))]
pub async fn update_category(
    State(state): State<AppState>,
    Path(id): Path<String>,
    ValidatedJson(dto): ValidatedJson<CategoryRequest>,
) -> Result<Json<ApiResponse<CategoryPayload>>, AppError> {
    let id = parse_id(&id, INVALID_CATEGORY_ID_MESSAGE)?;
    let category = CategoryService::update_category(state.categories.as_ref(), id, dto).await?;
    Ok(Json(ApiResponse::with_message(
        CATEGORY_UPDATED_MESSAGE,
        CategoryPayload { category },
    )))
}

/// Delete a category
#[utoipa::path(
    delete,
    path = "/category/delete-category/{id}",
    params(("id" = String, Path, description = "Category ID")),
    responses(
        (status = 200, description = "Category deleted", body = MessageResponse),
        (status = 400, description = "Malformed ID", body = ErrorResponse),
        (status = 404, description = "Category not found", body = ErrorResponse)
    ),
    tag = "Categories",
    security(("cookie_auth" = []))
)]
#[instrument(skip(state))]
pub async fn delete_category(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<ApiResponse<NoData>>, AppError> {
    let id = parse_id(&id, INVALID_CATEGORY_ID_MESSAGE)?;
    CategoryService::delete_category(state.categories.as_ref(), id).await?;
    Ok(Json(ApiResponse::message(CATEGORY_DELETED_MESSAGE)))
}
