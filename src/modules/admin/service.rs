use std::str::FromStr;

use tracing::instrument;
use uuid::Uuid;

use kurs_core::AppError;
use kurs_models::admin::Analytics;
use kurs_models::courses::{CourseDetails, CourseStatus};
use kurs_models::users::{User, UserRole};

use crate::middleware::auth::USER_NOT_FOUND_MESSAGE;
use crate::modules::courses::service::COURSE_NOT_FOUND_MESSAGE;
use crate::modules::users::credentials::{CredentialStore, ProfileChanges};
use crate::state::AppState;
use crate::utils::upload::remove_file;

pub const USERS_NOT_FOUND_MESSAGE: &str = "Foydalanuvchilar topilmadi";
pub const INVALID_USER_ID_MESSAGE: &str = "Noto'g'ri foydalanuvchi ID";
pub const INVALID_ROLE_MESSAGE: &str = "Noto'g'ri rol. Faqat 'admin' yoki 'student' bo'lishi mumkin";

/// Courses listed under `popularKurslar`.
pub const POPULAR_COURSES_LIMIT: i64 = 5;

pub struct AdminService;

impl AdminService {
    #[instrument(skip(state))]
    pub async fn get_users(state: &AppState) -> Result<Vec<User>, AppError> {
        let users: Vec<User> = state
            .users
            .list()
            .await?
            .into_iter()
            .map(User::from)
            .collect();

        if users.is_empty() {
            return Err(AppError::not_found(USERS_NOT_FOUND_MESSAGE));
        }
        Ok(users)
    }

    #[instrument(skip(state))]
    pub async fn update_role(
        state: &AppState,
        user_id: Uuid,
        role: Option<String>,
    ) -> Result<User, AppError> {
        let role = role
            .as_deref()
            .map(str::trim)
            .and_then(|r| UserRole::from_str(r).ok())
            .ok_or_else(|| AppError::bad_request(INVALID_ROLE_MESSAGE))?;

        let credentials = CredentialStore::new(state.users.clone());
        let record = credentials
            .save(
                user_id,
                ProfileChanges {
                    role: Some(role),
                    ..Default::default()
                },
            )
            .await?
            .ok_or_else(|| AppError::not_found(USER_NOT_FOUND_MESSAGE))?;

        tracing::info!(user.id = %user_id, user.role = %role, "Role updated");
        Ok(User::from(record))
    }

    /// Removes the user from every course first, so no enrollment list
    /// keeps a dangling id.
    #[instrument(skip(state))]
    pub async fn delete_user(state: &AppState, user_id: Uuid) -> Result<(), AppError> {
        let record = state
            .users
            .find_by_id(user_id)
            .await?
            .ok_or_else(|| AppError::not_found(USER_NOT_FOUND_MESSAGE))?;

        // Delete before the pull: enroll refuses missing users, so no id
        // can be added back afterwards.
        if !state.users.delete(user_id).await? {
            return Err(AppError::not_found(USER_NOT_FOUND_MESSAGE));
        }
        let pulled = state.courses.remove_student(user_id).await?;

        if let Some(image) = record.image.as_deref() {
            remove_file(state.files.as_ref(), image).await;
        }

        tracing::info!(user.id = %user_id, courses = pulled, "User deleted");
        Ok(())
    }

    #[instrument(skip(state))]
    pub async fn approve_course(state: &AppState, course_id: Uuid) -> Result<CourseDetails, AppError> {
        let course = state
            .courses
            .set_status(course_id, CourseStatus::Active)
            .await?
            .ok_or_else(|| AppError::not_found(COURSE_NOT_FOUND_MESSAGE))?;

        tracing::info!(course.id = %course_id, "Course approved");
        Ok(course)
    }

    #[instrument(skip(state))]
    pub async fn analytics(state: &AppState) -> Result<Analytics, AppError> {
        let total_users = state.users.count().await?;
        let total_kurslar = state.courses.count().await?;
        let popular_kurslar = state.courses.most_popular(POPULAR_COURSES_LIMIT).await?;

        Ok(Analytics {
            total_users,
            total_kurslar,
            popular_kurslar,
        })
    }
}
