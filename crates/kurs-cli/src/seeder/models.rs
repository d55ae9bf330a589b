//! Seed rows and seeding configuration.

use uuid::Uuid;

pub struct CategorySeed {
    pub name: String,
    pub description: Option<String>,
}

pub struct CourseSeed {
    pub title: String,
    pub description: String,
    pub duration: i32,
    pub price: f64,
    pub active: bool,
    pub category_id: Uuid,
}

pub struct StudentSeed {
    pub user_name: String,
    pub email: String,
    pub password_hash: String,
    pub tel: i64,
}

/// Complete configuration for database seeding.
#[derive(Clone)]
pub struct SeedConfig {
    pub num_categories: usize,
    pub courses_per_category: usize,
    pub num_students: usize,
    /// Upper bound on enrollments per active course
    pub max_enrollments: usize,
}

impl Default for SeedConfig {
    fn default() -> Self {
        Self {
            num_categories: 5,
            courses_per_category: 4,
            num_students: 50,
            max_enrollments: 10,
        }
    }
}

impl SeedConfig {
    pub fn new(num_categories: usize) -> Self {
        Self {
            num_categories,
            ..Default::default()
        }
    }

    pub fn with_courses(mut self, courses_per_category: usize) -> Self {
        self.courses_per_category = courses_per_category;
        self
    }

    pub fn with_students(mut self, num_students: usize) -> Self {
        self.num_students = num_students;
        self
    }

    pub fn total_courses(&self) -> usize {
        self.num_categories * self.courses_per_category
    }
}
