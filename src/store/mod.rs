//! Persistence seams.
//!
//! Handlers talk to the store through these traits. [`postgres::PgStore`]
//! implements all three for production; `memory::MemoryStore` (behind the
//! `test-utils` feature) backs the HTTP tests.
//!
//! Unique-key violations surface as 409 [`AppError`]s carrying the
//! caller-supplied message, so handlers that pre-check uniqueness still get
//! the right status when two requests race.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use uuid::Uuid;

use kurs_core::AppError;
use kurs_models::categories::{Category, CategoryChanges, NewCategory};
use kurs_models::courses::{Course, CourseChanges, CourseDetails, CourseStatus, NewCourse, PopularCourse};
use kurs_models::users::{NewUser, UserChanges, UserRecord};

#[cfg(any(test, feature = "test-utils"))]
pub mod memory;
pub mod postgres;

#[cfg(any(test, feature = "test-utils"))]
pub use memory::MemoryStore;
pub use postgres::PgStore;

pub const DUPLICATE_USER_MESSAGE: &str = "Bu foydalanuvchi tizimda mavjud";
pub const DUPLICATE_CATEGORY_MESSAGE: &str = "Bu nomdagi category tzimda mavjud";
pub const DUPLICATE_COURSE_MESSAGE: &str = "Bu kurs tzimda mavjud";

#[async_trait]
pub trait UserStore: Send + Sync {
    async fn find_by_id(&self, id: Uuid) -> Result<Option<UserRecord>, AppError>;

    async fn find_by_email(&self, email: &str) -> Result<Option<UserRecord>, AppError>;

    async fn list(&self) -> Result<Vec<UserRecord>, AppError>;

    async fn count(&self) -> Result<i64, AppError>;

    /// Fails with 409 when the email is taken.
    async fn insert(&self, user: NewUser) -> Result<UserRecord, AppError>;

    async fn update(&self, id: Uuid, changes: UserChanges) -> Result<Option<UserRecord>, AppError>;

    /// Stores a reset code, replacing any previous one.
    async fn set_reset_code(
        &self,
        id: Uuid,
        code: &str,
        expires_at: DateTime<Utc>,
    ) -> Result<(), AppError>;

    /// Atomically checks `email` + `code` + `expires_at > now`, and on a match
    /// stores `password_hash` and clears the reset fields. Returns `None`
    /// when nothing matched.
    async fn redeem_reset_code(
        &self,
        email: &str,
        code: &str,
        now: DateTime<Utc>,
        password_hash: &str,
    ) -> Result<Option<UserRecord>, AppError>;

    async fn delete(&self, id: Uuid) -> Result<bool, AppError>;
}

#[async_trait]
pub trait CategoryStore: Send + Sync {
    async fn list(&self) -> Result<Vec<Category>, AppError>;

    async fn find_by_id(&self, id: Uuid) -> Result<Option<Category>, AppError>;

    async fn find_by_name(&self, name: &str) -> Result<Option<Category>, AppError>;

    async fn insert(&self, category: NewCategory) -> Result<Category, AppError>;

    async fn update(
        &self,
        id: Uuid,
        changes: CategoryChanges,
    ) -> Result<Option<Category>, AppError>;

    async fn delete(&self, id: Uuid) -> Result<bool, AppError>;
}

#[async_trait]
pub trait CourseStore: Send + Sync {
    /// Every course with category and students resolved, oldest first.
    async fn list_populated(&self) -> Result<Vec<CourseDetails>, AppError>;

    async fn find_by_id(&self, id: Uuid) -> Result<Option<Course>, AppError>;

    async fn find_by_title(&self, title: &str) -> Result<Option<Course>, AppError>;

    async fn insert(&self, course: NewCourse) -> Result<Course, AppError>;

    async fn update(&self, id: Uuid, changes: CourseChanges) -> Result<Option<Course>, AppError>;

    async fn delete(&self, id: Uuid) -> Result<bool, AppError>;

    /// Sets the status and returns the populated course.
    async fn set_status(
        &self,
        id: Uuid,
        status: CourseStatus,
    ) -> Result<Option<CourseDetails>, AppError>;

    /// Adds `user_id` to the enrollment list unless already present. `None`
    /// when the course or the user does not exist; the user row is locked
    /// for the duration so a concurrent user delete waits for it.
    async fn enroll(&self, id: Uuid, user_id: Uuid) -> Result<Option<Course>, AppError>;

    /// Removes `user_id` from every enrollment list. Returns how many
    /// courses changed.
    async fn remove_student(&self, user_id: Uuid) -> Result<u64, AppError>;

    async fn count(&self) -> Result<i64, AppError>;

    /// Courses with the most students first; ties keep creation order.
    async fn most_popular(&self, limit: i64) -> Result<Vec<PopularCourse>, AppError>;
}
