//! Courses ("kurslar") and their enrollment lists ("talabalar").
//!
//! The API speaks Uzbek field names (`narxi` price, `davomiyligi` duration,
//! `talabalar` students); the database and Rust side use English ones.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use utoipa::ToSchema;
use uuid::Uuid;
use validator::Validate;

use crate::categories::CategorySummary;
use crate::users::UserSummary;

pub const NEGATIVE_AMOUNT_MESSAGE: &str = "Narx yoki davomiylik manfiy bo'lmasligi kerak";

#[derive(
    Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize, sqlx::Type, ToSchema,
)]
#[sqlx(type_name = "course_status", rename_all = "lowercase")]
#[serde(rename_all = "lowercase")]
pub enum CourseStatus {
    #[default]
    Pending,
    Active,
}

#[derive(Debug, Clone, PartialEq, Serialize, FromRow, ToSchema)]
pub struct Course {
    #[serde(rename = "_id")]
    pub id: Uuid,
    pub title: String,
    pub description: String,
    /// Duration
    #[serde(rename = "davomiyligi")]
    pub duration: i32,
    /// Price
    #[serde(rename = "narxi")]
    pub price: f64,
    pub status: CourseStatus,
    #[serde(rename = "category")]
    pub category_id: Option<Uuid>,
    /// Enrolled user ids, no duplicates
    #[serde(rename = "talabalar")]
    pub students: Vec<Uuid>,
    #[serde(rename = "createdAt")]
    pub created_at: DateTime<Utc>,
    #[serde(rename = "updatedAt")]
    pub updated_at: DateTime<Utc>,
}

/// A course with its category and students resolved.
#[derive(Debug, Clone, PartialEq, Serialize, ToSchema)]
pub struct CourseDetails {
    #[serde(rename = "_id")]
    pub id: Uuid,
    pub title: String,
    pub description: String,
    #[serde(rename = "davomiyligi")]
    pub duration: i32,
    #[serde(rename = "narxi")]
    pub price: f64,
    pub status: CourseStatus,
    pub category: Option<CategorySummary>,
    #[serde(rename = "talabalar")]
    pub students: Vec<UserSummary>,
    #[serde(rename = "createdAt")]
    pub created_at: DateTime<Utc>,
    #[serde(rename = "updatedAt")]
    pub updated_at: DateTime<Utc>,
}

impl CourseDetails {
    /// Joins a course with its resolved references. Students that no longer
    /// resolve are dropped.
    pub fn populate(
        course: Course,
        category: Option<CategorySummary>,
        students: &[UserSummary],
    ) -> Self {
        let students = course
            .students
            .iter()
            .filter_map(|id| students.iter().find(|s| s.id == *id).cloned())
            .collect();

        Self {
            id: course.id,
            title: course.title,
            description: course.description,
            duration: course.duration,
            price: course.price,
            status: course.status,
            category,
            students,
            created_at: course.created_at,
            updated_at: course.updated_at,
        }
    }
}

#[derive(Debug, Clone)]
pub struct NewCourse {
    pub title: String,
    pub description: String,
    pub duration: i32,
    pub price: f64,
    pub category_id: Option<Uuid>,
}

#[derive(Debug, Clone, Default)]
pub struct CourseChanges {
    pub title: Option<String>,
    pub description: Option<String>,
    pub duration: Option<i32>,
    pub price: Option<f64>,
    pub category_id: Option<Uuid>,
}

/// Body of add-kurs and update-kurs. On update every field is optional.
#[derive(Debug, Clone, Deserialize, Validate, ToSchema)]
pub struct CourseRequest {
    #[schema(example = "Rust asoslari")]
    pub title: Option<String>,
    pub description: Option<String>,
    #[validate(range(min = 0, message = "Narx yoki davomiylik manfiy bo'lmasligi kerak"))]
    #[schema(example = 12)]
    pub davomiyligi: Option<i32>,
    #[validate(range(min = 0.0, message = "Narx yoki davomiylik manfiy bo'lmasligi kerak"))]
    #[schema(example = 500000.0)]
    pub narxi: Option<f64>,
    /// Category id
    pub category: Option<String>,
}

/// Course ranked by enrollment count.
#[derive(Debug, Clone, PartialEq, Serialize, FromRow, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct PopularCourse {
    #[serde(rename = "_id")]
    pub id: Uuid,
    pub title: String,
    pub student_count: i64,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct CoursePayload {
    pub kurs: Course,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct CoursesPayload {
    pub kurslar: Vec<CourseDetails>,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct CourseDetailsPayload {
    pub data: CourseDetails,
}
