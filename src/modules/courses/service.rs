use tracing::instrument;
use uuid::Uuid;

use kurs_core::AppError;
use kurs_core::ids::parse_id;
use kurs_models::courses::{
    Course, CourseChanges, CourseDetails, CourseRequest, CourseStatus, NEGATIVE_AMOUNT_MESSAGE,
    NewCourse,
};

use crate::modules::auth::service::FILL_ALL_FIELDS_MESSAGE;
use crate::modules::categories::service::{CATEGORY_NOT_FOUND_MESSAGE, INVALID_CATEGORY_ID_MESSAGE};
use crate::state::AppState;
use crate::store::DUPLICATE_COURSE_MESSAGE;

pub const INVALID_COURSE_ID_MESSAGE: &str = "Noto'g'ri yoki mavjud bo'lmagan kurs ID";
pub const COURSE_NOT_FOUND_MESSAGE: &str = "Kurs topilmadi";
pub const COURSES_NOT_FOUND_MESSAGE: &str = "Kurslar topilmadi";
pub const COURSE_NOT_ACTIVE_MESSAGE: &str = "Kurs hali tasdiqlanmagan";

pub struct CourseService;

impl CourseService {
    #[instrument(skip(state))]
    pub async fn create_course(state: &AppState, dto: CourseRequest) -> Result<Course, AppError> {
        let (Some(title), Some(description), Some(duration), Some(price), Some(category)) = (
            non_blank(dto.title),
            non_blank(dto.description),
            dto.davomiyligi,
            dto.narxi,
            non_blank(dto.category),
        ) else {
            return Err(AppError::bad_request(FILL_ALL_FIELDS_MESSAGE));
        };

        check_amounts(Some(duration), Some(price))?;
        let category_id = Self::resolve_category(state, &category).await?;

        if state.courses.find_by_title(&title).await?.is_some() {
            return Err(AppError::conflict(DUPLICATE_COURSE_MESSAGE));
        }

        let course = state
            .courses
            .insert(NewCourse {
                title,
                description,
                duration,
                price,
                category_id: Some(category_id),
            })
            .await?;

        tracing::info!(course.id = %course.id, "Course created");
        Ok(course)
    }

    /// Every course, populated. An empty catalogue is a 404.
    #[instrument(skip(state))]
    pub async fn get_courses(state: &AppState) -> Result<Vec<CourseDetails>, AppError> {
        let courses = state.courses.list_populated().await?;
        if courses.is_empty() {
            return Err(AppError::not_found(COURSES_NOT_FOUND_MESSAGE));
        }
        Ok(courses)
    }

    #[instrument(skip(state))]
    pub async fn update_course(
        state: &AppState,
        id: Uuid,
        dto: CourseRequest,
    ) -> Result<Course, AppError> {
        state
            .courses
            .find_by_id(id)
            .await?
            .ok_or_else(|| AppError::not_found(COURSE_NOT_FOUND_MESSAGE))?;

        check_amounts(dto.davomiyligi, dto.narxi)?;

        let title = non_blank(dto.title);
        if let Some(title) = title.as_deref() {
            if let Some(existing) = state.courses.find_by_title(title).await? {
                if existing.id != id {
                    return Err(AppError::conflict(DUPLICATE_COURSE_MESSAGE));
                }
            }
        }

        let category_id = match non_blank(dto.category) {
            Some(raw) => Some(Self::resolve_category(state, &raw).await?),
            None => None,
        };

        state
            .courses
            .update(
                id,
                CourseChanges {
                    title,
                    description: non_blank(dto.description),
                    duration: dto.davomiyligi,
                    price: dto.narxi,
                    category_id,
                },
            )
            .await?
            .ok_or_else(|| AppError::not_found(COURSE_NOT_FOUND_MESSAGE))
    }

    #[instrument(skip(state))]
    pub async fn delete_course(state: &AppState, id: Uuid) -> Result<(), AppError> {
        if !state.courses.delete(id).await? {
            return Err(AppError::not_found(COURSE_NOT_FOUND_MESSAGE));
        }
        tracing::info!(course.id = %id, "Course deleted");
        Ok(())
    }

    /// Adds the caller to the course's students. Enrolling twice is a no-op.
    #[instrument(skip(state))]
    pub async fn enroll(state: &AppState, id: Uuid, user_id: Uuid) -> Result<Course, AppError> {
        let course = state
            .courses
            .find_by_id(id)
            .await?
            .ok_or_else(|| AppError::not_found(COURSE_NOT_FOUND_MESSAGE))?;

        if course.status != CourseStatus::Active {
            return Err(AppError::bad_request(COURSE_NOT_ACTIVE_MESSAGE));
        }

        let course = state
            .courses
            .enroll(id, user_id)
            .await?
            .ok_or_else(|| AppError::not_found(COURSE_NOT_FOUND_MESSAGE))?;

        tracing::info!(course.id = %id, user.id = %user_id, "Student enrolled");
        Ok(course)
    }

    async fn resolve_category(state: &AppState, raw: &str) -> Result<Uuid, AppError> {
        let category_id = parse_id(raw, INVALID_CATEGORY_ID_MESSAGE)?;
        state
            .categories
            .find_by_id(category_id)
            .await?
            .ok_or_else(|| AppError::not_found(CATEGORY_NOT_FOUND_MESSAGE))?;
        Ok(category_id)
    }
}

fn check_amounts(duration: Option<i32>, price: Option<f64>) -> Result<(), AppError> {
    let negative_duration = duration.is_some_and(|d| d < 0);
    let bad_price = price.is_some_and(|p| p < 0.0 || !p.is_finite());
    if negative_duration || bad_price {
        return Err(AppError::bad_request(NEGATIVE_AMOUNT_MESSAGE));
    }
    Ok(())
}

fn non_blank(value: Option<String>) -> Option<String> {
    value
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}
