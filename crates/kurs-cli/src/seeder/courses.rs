//! Course and enrollment seeding.

use fake::faker::lorem::en::{Paragraph, Words};
use fake::{Fake, Faker};
use rayon::prelude::*;
use sqlx::{PgPool, Postgres, Transaction};
use std::time::Instant;
use uuid::Uuid;

use super::models::CourseSeed;

const BATCH_SIZE: usize = 500;

/// Generates `per_category` courses for each category. Roughly half are
/// active; titles carry their index so they stay unique.
pub fn generate_courses(category_ids: &[Uuid], per_category: usize) -> Vec<CourseSeed> {
    category_ids
        .par_iter()
        .enumerate()
        .flat_map(|(category_idx, &category_id)| {
            (0..per_category)
                .map(|course_idx| {
                    let words: Vec<String> = Words(2..4).fake();
                    let description: String = Paragraph(1..3).fake();
                    let price_thousands: i64 = (100..2_000).fake();

                    CourseSeed {
                        title: format!(
                            "{} #{}",
                            words.join(" "),
                            category_idx * 1000 + course_idx + 1
                        ),
                        description,
                        duration: (1..48).fake(),
                        price: (price_thousands * 1000) as f64,
                        active: Faker.fake(),
                        category_id,
                    }
                })
                .collect::<Vec<_>>()
        })
        .collect()
}

/// Picks up to `max` distinct students for one course.
pub fn pick_students(student_ids: &[Uuid], max: usize) -> Vec<Uuid> {
    if student_ids.is_empty() || max == 0 {
        return Vec::new();
    }

    let wanted: usize = (0..=max.min(student_ids.len())).fake();
    let mut picked: Vec<Uuid> = Vec::with_capacity(wanted);
    while picked.len() < wanted {
        let candidate = student_ids[(0..student_ids.len()).fake::<usize>()];
        if !picked.contains(&candidate) {
            picked.push(candidate);
        }
    }
    picked
}

pub async fn seed_courses(
    db: &PgPool,
    category_ids: &[Uuid],
    per_category: usize,
) -> Result<Vec<(Uuid, bool)>, Box<dyn std::error::Error>> {
    let start_time = Instant::now();
    println!(
        "📖 Seeding {} courses...",
        category_ids.len() * per_category
    );

    let courses = generate_courses(category_ids, per_category);
    let mut tx = db.begin().await?;
    let mut inserted = Vec::with_capacity(courses.len());
    for chunk in courses.chunks(BATCH_SIZE) {
        inserted.extend(insert_courses_chunk(&mut tx, chunk).await?);
    }
    tx.commit().await?;

    println!(
        "   ✓ Inserted {} courses in {:?}",
        inserted.len(),
        start_time.elapsed()
    );

    Ok(inserted)
}

async fn insert_courses_chunk(
    tx: &mut Transaction<'_, Postgres>,
    courses: &[CourseSeed],
) -> Result<Vec<(Uuid, bool)>, Box<dyn std::error::Error>> {
    if courses.is_empty() {
        return Ok(Vec::new());
    }

    let mut query = String::from(
        "INSERT INTO courses (title, description, duration, price, status, category_id) VALUES ",
    );
    for i in 0..courses.len() {
        if i > 0 {
            query.push_str(", ");
        }
        let p = i * 6;
        query.push_str(&format!(
            "(${}, ${}, ${}, ${}, ${}::course_status, ${})",
            p + 1,
            p + 2,
            p + 3,
            p + 4,
            p + 5,
            p + 6
        ));
    }
    query.push_str(" ON CONFLICT (title) DO NOTHING RETURNING id, status = 'active'");

    let mut q = sqlx::query_as::<_, (Uuid, bool)>(&query);
    for course in courses {
        q = q
            .bind(&course.title)
            .bind(&course.description)
            .bind(course.duration)
            .bind(course.price)
            .bind(if course.active { "active" } else { "pending" })
            .bind(course.category_id);
    }

    Ok(q.fetch_all(&mut **tx).await?)
}

/// Fills the enrollment lists of active courses with random students.
pub async fn seed_enrollments(
    db: &PgPool,
    courses: &[(Uuid, bool)],
    student_ids: &[Uuid],
    max_per_course: usize,
) -> Result<usize, Box<dyn std::error::Error>> {
    let start_time = Instant::now();

    let enrollments: Vec<(Uuid, Vec<Uuid>)> = courses
        .par_iter()
        .filter(|(_, active)| *active)
        .map(|(id, _)| (*id, pick_students(student_ids, max_per_course)))
        .collect();

    let mut tx = db.begin().await?;
    let mut total = 0;
    for (course_id, students) in &enrollments {
        sqlx::query("UPDATE courses SET students = $2, updated_at = NOW() WHERE id = $1")
            .bind(course_id)
            .bind(students)
            .execute(&mut *tx)
            .await?;
        total += students.len();
    }
    tx.commit().await?;

    println!(
        "   ✓ Created {} enrollments in {:?}",
        total,
        start_time.elapsed()
    );
    Ok(total)
}

pub async fn clear_courses(db: &PgPool) -> Result<u64, Box<dyn std::error::Error>> {
    let result = sqlx::query("DELETE FROM courses")
        .execute(db)
        .await?
        .rows_affected();

    println!("   ✓ Deleted {} courses", result);
    Ok(result)
}
