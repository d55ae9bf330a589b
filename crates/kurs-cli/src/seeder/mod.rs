//! Database seeding with fake data.
//!
//! Rows are generated in parallel with Rayon and inserted with multi-value
//! `INSERT` statements inside a transaction per table.

pub mod categories;
pub mod courses;
pub mod models;
pub mod students;

use sqlx::PgPool;
use std::time::Instant;

pub use models::SeedConfig;

/// Seeds categories, courses, students and enrollments.
pub async fn seed_all(db: &PgPool, config: SeedConfig) -> Result<(), Box<dyn std::error::Error>> {
    let start_time = Instant::now();
    println!("🌱 Seeding database...");

    let category_ids = categories::seed_categories(db, config.num_categories).await?;
    let courses =
        courses::seed_courses(db, &category_ids, config.courses_per_category).await?;
    let student_ids = students::seed_students(db, config.num_students).await?;
    courses::seed_enrollments(db, &courses, &student_ids, config.max_enrollments).await?;

    println!("\n✅ Seeding finished in {:?}", start_time.elapsed());
    Ok(())
}

/// Removes courses, categories and seeded students. Real accounts,
/// including admins, are kept.
pub async fn clear_all(db: &PgPool) -> Result<(), Box<dyn std::error::Error>> {
    println!("🗑️  Clearing seeded data...");

    courses::clear_courses(db).await?;
    categories::clear_categories(db).await?;
    students::clear_students(db).await?;

    println!("✅ Seeded data cleared");
    Ok(())
}
