use utoipa::openapi::security::{ApiKey, ApiKeyValue, SecurityScheme};
use utoipa::{Modify, OpenApi, ToSchema};

use kurs_models::admin::{Analytics, AnalyticsPayload, UpdateRoleRequest, UsersPayload};
use kurs_models::auth::{
    AccessTokenPayload, ForgotPasswordRequest, LoginRequest, RegisterRequest,
    ResetPasswordRequest, SessionPayload, UserPayload,
};
use kurs_models::categories::{
    CategoriesPayload, Category, CategoryPayload, CategoryRequest, CategorySummary,
};
use kurs_models::courses::{
    Course, CourseDetails, CourseDetailsPayload, CoursePayload, CourseRequest, CourseStatus,
    CoursesPayload, PopularCourse,
};
use kurs_models::users::{User, UserRole, UserSummary};

use crate::modules::auth::controller::RegisterMultipart;
use crate::modules::users::controller::UpdateUserMultipart;
use crate::utils::cookies::ACCESS_TOKEN_COOKIE;

/// Body of every failed request.
#[allow(dead_code)]
#[derive(ToSchema)]
pub struct ErrorResponse {
    #[schema(example = false)]
    pub success: bool,
    pub message: String,
}

/// Body of requests that only report an outcome.
#[allow(dead_code)]
#[derive(ToSchema)]
pub struct MessageResponse {
    #[schema(example = true)]
    pub success: bool,
    pub message: String,
}

#[derive(OpenApi)]
#[openapi(
    paths(
        crate::modules::auth::controller::register_user,
        crate::modules::auth::controller::login_user,
        crate::modules::auth::controller::refresh_token,
        crate::modules::auth::controller::logout_user,
        crate::modules::auth::controller::forgot_password,
        crate::modules::auth::controller::reset_password,
        crate::modules::users::controller::get_profile,
        crate::modules::users::controller::update_user,
        crate::modules::categories::controller::add_category,
        crate::modules::categories::controller::get_categories,
        crate::modules::categories::controller::update_category,
        crate::modules::categories::controller::delete_category,
        crate::modules::courses::controller::add_course,
        crate::modules::courses::controller::get_courses,
        crate::modules::courses::controller::update_course,
        crate::modules::courses::controller::delete_course,
        crate::modules::courses::controller::enroll_course,
        crate::modules::admin::controller::get_users,
        crate::modules::admin::controller::update_user_role,
        crate::modules::admin::controller::delete_user,
        crate::modules::admin::controller::approve_course,
        crate::modules::admin::controller::get_analytics,
    ),
    components(
        schemas(
            User,
            UserRole,
            UserSummary,
            RegisterRequest,
            LoginRequest,
            ForgotPasswordRequest,
            ResetPasswordRequest,
            SessionPayload,
            AccessTokenPayload,
            UserPayload,
            UpdateUserMultipart,
            RegisterMultipart,
            Category,
            CategorySummary,
            CategoryRequest,
            CategoryPayload,
            CategoriesPayload,
            Course,
            CourseStatus,
            CourseDetails,
            CourseRequest,
            CoursePayload,
            CoursesPayload,
            CourseDetailsPayload,
            PopularCourse,
            UpdateRoleRequest,
            UsersPayload,
            Analytics,
            AnalyticsPayload,
            ErrorResponse,
            MessageResponse,
        )
    ),
    modifiers(&SecurityAddon),
    tags(
        (name = "Authentication", description = "Registration, login, session cookies and password reset"),
        (name = "Users", description = "Profile of the authenticated user"),
        (name = "Categories", description = "Course categories"),
        (name = "Courses", description = "Course catalogue and enrollment"),
        (name = "Admin", description = "User management, course approval and analytics")
    ),
    info(
        title = "Kurs API",
        version = "0.1.0",
        description = "Course enrollment backend built with Rust, Axum and PostgreSQL. Sessions use http-only cookies.",
    )
)]
pub struct ApiDoc;

struct SecurityAddon;

impl Modify for SecurityAddon {
    fn modify(&self, openapi: &mut utoipa::openapi::OpenApi) {
        if let Some(components) = openapi.components.as_mut() {
            components.add_security_scheme(
                "cookie_auth",
                SecurityScheme::ApiKey(ApiKey::Cookie(ApiKeyValue::new(ACCESS_TOKEN_COOKIE))),
            )
        }
    }
}
