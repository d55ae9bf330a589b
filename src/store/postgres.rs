use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::PgPool;
use tracing::instrument;
use uuid::Uuid;

use kurs_core::AppError;
use kurs_models::categories::{Category, CategoryChanges, CategorySummary, NewCategory};
use kurs_models::courses::{
    Course, CourseChanges, CourseDetails, CourseStatus, NewCourse, PopularCourse,
};
use kurs_models::users::{NewUser, UserChanges, UserRecord, UserSummary};

use super::{
    CategoryStore, CourseStore, DUPLICATE_CATEGORY_MESSAGE, DUPLICATE_COURSE_MESSAGE,
    DUPLICATE_USER_MESSAGE, UserStore,
};

const USER_COLUMNS: &str = "id, user_name, email, password_hash, tel, image, role, \
     reset_password_token, reset_password_expire, created_at, updated_at";

const CATEGORY_COLUMNS: &str = "id, name, description, created_at, updated_at";

const COURSE_COLUMNS: &str = "id, title, description, duration, price, status, category_id, \
     students, created_at, updated_at";

#[derive(Clone, Debug)]
pub struct PgStore {
    pool: PgPool,
}

impl PgStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    async fn populate(&self, courses: Vec<Course>) -> Result<Vec<CourseDetails>, AppError> {
        let category_ids: Vec<Uuid> = courses.iter().filter_map(|c| c.category_id).collect();
        let student_ids: Vec<Uuid> = courses
            .iter()
            .flat_map(|c| c.students.iter().copied())
            .collect();

        let categories = sqlx::query_as::<_, CategorySummary>(
            "SELECT id, name, description FROM categories WHERE id = ANY($1)",
        )
        .bind(&category_ids)
        .fetch_all(&self.pool)
        .await
        .map_err(AppError::database)?;

        let students = sqlx::query_as::<_, UserSummary>(
            "SELECT id, user_name, tel, email FROM users WHERE id = ANY($1)",
        )
        .bind(&student_ids)
        .fetch_all(&self.pool)
        .await
        .map_err(AppError::database)?;

        Ok(courses
            .into_iter()
            .map(|course| {
                let category = course
                    .category_id
                    .and_then(|id| categories.iter().find(|c| c.id == id).cloned());
                CourseDetails::populate(course, category, &students)
            })
            .collect())
    }
}

fn map_write_error(err: sqlx::Error, duplicate_message: &str) -> AppError {
    match &err {
        sqlx::Error::Database(db) if db.is_unique_violation() => {
            AppError::conflict(duplicate_message)
        }
        _ => AppError::database(err),
    }
}

#[async_trait]
impl UserStore for PgStore {
    #[instrument(skip(self))]
    async fn find_by_id(&self, id: Uuid) -> Result<Option<UserRecord>, AppError> {
        let sql = format!("SELECT {USER_COLUMNS} FROM users WHERE id = $1");
        sqlx::query_as::<_, UserRecord>(&sql)
            .bind(id)
            .fetch_optional(&self.pool)
            .await
            .map_err(AppError::database)
    }

    #[instrument(skip(self))]
    async fn find_by_email(&self, email: &str) -> Result<Option<UserRecord>, AppError> {
        let sql = format!("SELECT {USER_COLUMNS} FROM users WHERE email = $1");
        sqlx::query_as::<_, UserRecord>(&sql)
            .bind(email)
            .fetch_optional(&self.pool)
            .await
            .map_err(AppError::database)
    }

    #[instrument(skip(self))]
    async fn list(&self) -> Result<Vec<UserRecord>, AppError> {
        let sql = format!("SELECT {USER_COLUMNS} FROM users ORDER BY created_at, id");
        sqlx::query_as::<_, UserRecord>(&sql)
            .fetch_all(&self.pool)
            .await
            .map_err(AppError::database)
    }

    #[instrument(skip(self))]
    async fn count(&self) -> Result<i64, AppError> {
        sqlx::query_scalar::<_, i64>("SELECT COUNT(*) FROM users")
            .fetch_one(&self.pool)
            .await
            .map_err(AppError::database)
    }

    #[instrument(skip(self, user), fields(email = %user.email))]
    async fn insert(&self, user: NewUser) -> Result<UserRecord, AppError> {
        let sql = format!(
            "INSERT INTO users (id, user_name, email, password_hash, tel, image, role) \
             VALUES ($1, $2, $3, $4, $5, $6, $7) RETURNING {USER_COLUMNS}"
        );
        sqlx::query_as::<_, UserRecord>(&sql)
            .bind(Uuid::new_v4())
            .bind(&user.user_name)
            .bind(&user.email)
            .bind(&user.password_hash)
            .bind(user.tel)
            .bind(&user.image)
            .bind(user.role)
            .fetch_one(&self.pool)
            .await
            .map_err(|e| map_write_error(e, DUPLICATE_USER_MESSAGE))
    }

    #[instrument(skip(self, changes))]
    async fn update(&self, id: Uuid, changes: UserChanges) -> Result<Option<UserRecord>, AppError> {
        let sql = format!(
            "UPDATE users SET \
                 user_name = COALESCE($2, user_name), \
                 password_hash = COALESCE($3, password_hash), \
                 image = COALESCE($4, image), \
                 role = COALESCE($5, role), \
                 updated_at = now() \
             WHERE id = $1 RETURNING {USER_COLUMNS}"
        );
        sqlx::query_as::<_, UserRecord>(&sql)
            .bind(id)
            .bind(&changes.user_name)
            .bind(&changes.password_hash)
            .bind(&changes.image)
            .bind(changes.role)
            .fetch_optional(&self.pool)
            .await
            .map_err(AppError::database)
    }

    #[instrument(skip(self, code))]
    async fn set_reset_code(
        &self,
        id: Uuid,
        code: &str,
        expires_at: DateTime<Utc>,
    ) -> Result<(), AppError> {
        sqlx::query(
            "UPDATE users SET reset_password_token = $2, reset_password_expire = $3, \
             updated_at = now() WHERE id = $1",
        )
        .bind(id)
        .bind(code)
        .bind(expires_at)
        .execute(&self.pool)
        .await
        .map_err(AppError::database)?;
        Ok(())
    }

    #[instrument(skip(self, code, password_hash))]
    async fn redeem_reset_code(
        &self,
        email: &str,
        code: &str,
        now: DateTime<Utc>,
        password_hash: &str,
    ) -> Result<Option<UserRecord>, AppError> {
        let sql = format!(
            "UPDATE users SET password_hash = $4, reset_password_token = NULL, \
                 reset_password_expire = NULL, updated_at = now() \
             WHERE email = $1 AND reset_password_token = $2 AND reset_password_expire > $3 \
             RETURNING {USER_COLUMNS}"
        );
        sqlx::query_as::<_, UserRecord>(&sql)
            .bind(email)
            .bind(code)
            .bind(now)
            .bind(password_hash)
            .fetch_optional(&self.pool)
            .await
            .map_err(AppError::database)
    }

    #[instrument(skip(self))]
    async fn delete(&self, id: Uuid) -> Result<bool, AppError> {
        let result = sqlx::query("DELETE FROM users WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await
            .map_err(AppError::database)?;
        Ok(result.rows_affected() > 0)
    }
}

#[async_trait]
impl CategoryStore for PgStore {
    #[instrument(skip(self))]
    async fn list(&self) -> Result<Vec<Category>, AppError> {
        let sql = format!("SELECT {CATEGORY_COLUMNS} FROM categories ORDER BY created_at, id");
        sqlx::query_as::<_, Category>(&sql)
            .fetch_all(&self.pool)
            .await
            .map_err(AppError::database)
    }

    #[instrument(skip(self))]
    async fn find_by_id(&self, id: Uuid) -> Result<Option<Category>, AppError> {
        let sql = format!("SELECT {CATEGORY_COLUMNS} FROM categories WHERE id = $1");
        sqlx::query_as::<_, Category>(&sql)
            .bind(id)
            .fetch_optional(&self.pool)
            .await
            .map_err(AppError::database)
    }

    #[instrument(skip(self))]
    async fn find_by_name(&self, name: &str) -> Result<Option<Category>, AppError> {
        let sql = format!("SELECT {CATEGORY_COLUMNS} FROM categories WHERE name = $1");
        sqlx::query_as::<_, Category>(&sql)
            .bind(name)
            .fetch_optional(&self.pool)
            .await
            .map_err(AppError::database)
    }

    #[instrument(skip(self, category), fields(name = %category.name))]
    async fn insert(&self, category: NewCategory) -> Result<Category, AppError> {
        let sql = format!(
            "INSERT INTO categories (id, name, description) VALUES ($1, $2, $3) \
             RETURNING {CATEGORY_COLUMNS}"
        );
        sqlx::query_as::<_, Category>(&sql)
            .bind(Uuid::new_v4())
            .bind(&category.name)
            .bind(&category.description)
            .fetch_one(&self.pool)
            .await
            .map_err(|e| map_write_error(e, DUPLICATE_CATEGORY_MESSAGE))
    }

    #[instrument(skip(self, changes))]
    async fn update(
        &self,
        id: Uuid,
        changes: CategoryChanges,
    ) -> Result<Option<Category>, AppError> {
        let sql = format!(
            "UPDATE categories SET \
                 name = COALESCE($2, name), \
                 description = COALESCE($3, description), \
                 updated_at = now() \
             WHERE id = $1 RETURNING {CATEGORY_COLUMNS}"
        );
        sqlx::query_as::<_, Category>(&sql)
            .bind(id)
            .bind(&changes.name)
            .bind(&changes.description)
            .fetch_optional(&self.pool)
            .await
            .map_err(|e| map_write_error(e, DUPLICATE_CATEGORY_MESSAGE))
    }

    #[instrument(skip(self))]
    async fn delete(&self, id: Uuid) -> Result<bool, AppError> {
        let result = sqlx::query("DELETE FROM categories WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await
            .map_err(AppError::database)?;
        Ok(result.rows_affected() > 0)
    }
}

#[async_trait]
impl CourseStore for PgStore {
    #[instrument(skip(self))]
    async fn list_populated(&self) -> Result<Vec<CourseDetails>, AppError> {
        let sql = format!("SELECT {COURSE_COLUMNS} FROM courses ORDER BY created_at, id");
        let courses = sqlx::query_as::<_, Course>(&sql)
            .fetch_all(&self.pool)
            .await
            .map_err(AppError::database)?;
        self.populate(courses).await
    }

    #[instrument(skip(self))]
    async fn find_by_id(&self, id: Uuid) -> Result<Option<Course>, AppError> {
        let sql = format!("SELECT {COURSE_COLUMNS} FROM courses WHERE id = $1");
        sqlx::query_as::<_, Course>(&sql)
            .bind(id)
            .fetch_optional(&self.pool)
            .await
            .map_err(AppError::database)
    }

    #[instrument(skip(self))]
    async fn find_by_title(&self, title: &str) -> Result<Option<Course>, AppError> {
        let sql = format!("SELECT {COURSE_COLUMNS} FROM courses WHERE title = $1");
        sqlx::query_as::<_, Course>(&sql)
            .bind(title)
            .fetch_optional(&self.pool)
            .await
            .map_err(AppError::database)
    }

    #[instrument(skip(self, course), fields(title = %course.title))]
    async fn insert(&self, course: NewCourse) -> Result<Course, AppError> {
        let sql = format!(
            "INSERT INTO courses (id, title, description, duration, price, category_id) \
             VALUES ($1, $2, $3, $4, $5, $6) RETURNING {COURSE_COLUMNS}"
        );
        sqlx::query_as::<_, Course>(&sql)
            .bind(Uuid::new_v4())
            .bind(&course.title)
            .bind(&course.description)
            .bind(course.duration)
            .bind(course.price)
            .bind(course.category_id)
            .fetch_one(&self.pool)
            .await
            .map_err(|e| map_write_error(e, DUPLICATE_COURSE_MESSAGE))
    }

    #[instrument(skip(self, changes))]
    async fn update(&self, id: Uuid, changes: CourseChanges) -> Result<Option<Course>, AppError> {
        let sql = format!(
            "UPDATE courses SET \
                 title = COALESCE($2, title), \
                 description = COALESCE($3, description), \
                 duration = COALESCE($4, duration), \
                 price = COALESCE($5, price), \
                 category_id = COALESCE($6, category_id), \
                 updated_at = now() \
             WHERE id = $1 RETURNING {COURSE_COLUMNS}"
        );
        sqlx::query_as::<_, Course>(&sql)
            .bind(id)
            .bind(&changes.title)
            .bind(&changes.description)
            .bind(changes.duration)
            .bind(changes.price)
            .bind(changes.category_id)
            .fetch_optional(&self.pool)
            .await
            .map_err(|e| map_write_error(e, DUPLICATE_COURSE_MESSAGE))
    }

    #[instrument(skip(self))]
    async fn delete(&self, id: Uuid) -> Result<bool, AppError> {
        let result = sqlx::query("DELETE FROM courses WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await
            .map_err(AppError::database)?;
        Ok(result.rows_affected() > 0)
    }

    #[instrument(skip(self))]
    async fn set_status(
        &self,
        id: Uuid,
        status: CourseStatus,
    ) -> Result<Option<CourseDetails>, AppError> {
        let sql = format!(
            "UPDATE courses SET status = $2, updated_at = now() WHERE id = $1 \
             RETURNING {COURSE_COLUMNS}"
        );
        let course = sqlx::query_as::<_, Course>(&sql)
            .bind(id)
            .bind(status)
            .fetch_optional(&self.pool)
            .await
            .map_err(AppError::database)?;

        match course {
            Some(course) => Ok(self.populate(vec![course]).await?.pop()),
            None => Ok(None),
        }
    }

    #[instrument(skip(self))]
    async fn enroll(&self, id: Uuid, user_id: Uuid) -> Result<Option<Course>, AppError> {
        let sql = format!(
            "UPDATE courses SET \
                 students = CASE WHEN $2 = ANY(students) THEN students \
                                 ELSE array_append(students, $2) END, \
                 updated_at = now() \
             WHERE id = $1 \
               AND EXISTS (SELECT 1 FROM users WHERE id = $2 FOR KEY SHARE) \
             RETURNING {COURSE_COLUMNS}"
        );
        sqlx::query_as::<_, Course>(&sql)
            .bind(id)
            .bind(user_id)
            .fetch_optional(&self.pool)
            .await
            .map_err(AppError::database)
    }

    #[instrument(skip(self))]
    async fn remove_student(&self, user_id: Uuid) -> Result<u64, AppError> {
        let result = sqlx::query(
            "UPDATE courses SET students = array_remove(students, $1), updated_at = now() \
             WHERE $1 = ANY(students)",
        )
        .bind(user_id)
        .execute(&self.pool)
        .await
        .map_err(AppError::database)?;
        Ok(result.rows_affected())
    }

    #[instrument(skip(self))]
    async fn count(&self) -> Result<i64, AppError> {
        sqlx::query_scalar::<_, i64>("SELECT COUNT(*) FROM courses")
            .fetch_one(&self.pool)
            .await
            .map_err(AppError::database)
    }

    #[instrument(skip(self))]
    async fn most_popular(&self, limit: i64) -> Result<Vec<PopularCourse>, AppError> {
        sqlx::query_as::<_, PopularCourse>(
            "SELECT id, title, cardinality(students)::BIGINT AS student_count FROM courses \
             ORDER BY student_count DESC, created_at, id LIMIT $1",
        )
        .bind(limit)
        .fetch_all(&self.pool)
        .await
        .map_err(AppError::database)
    }
}
