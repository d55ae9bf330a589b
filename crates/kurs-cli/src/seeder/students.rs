//! Student seeding.

use fake::Fake;
use fake::faker::name::en::{FirstName, LastName};
use rayon::prelude::*;
use sqlx::{PgPool, Postgres, Transaction};
use std::time::Instant;
use uuid::Uuid;

use super::models::StudentSeed;

/// Every seeded email ends with this, so seeded users can be cleared
/// without touching real accounts.
pub const SEED_EMAIL_DOMAIN: &str = "seed.kurs.local";

/// Password of every seeded student.
pub const SEED_PASSWORD: &str = "Student#123";

const BATCH_SIZE: usize = 500;

pub fn generate_students(count: usize, password_hash: &str) -> Vec<StudentSeed> {
    (0..count)
        .into_par_iter()
        .map(|idx| {
            let first_name: String = FirstName().fake();
            let last_name: String = LastName().fake();

            StudentSeed {
                email: format!(
                    "{}.{}+{}@{}",
                    first_name.to_lowercase(),
                    last_name.to_lowercase(),
                    idx,
                    SEED_EMAIL_DOMAIN
                ),
                user_name: format!("{} {}", first_name, last_name),
                password_hash: password_hash.to_string(),
                tel: (998_900_000_000i64..998_999_999_999).fake(),
            }
        })
        .collect()
}

pub async fn seed_students(
    db: &PgPool,
    count: usize,
) -> Result<Vec<Uuid>, Box<dyn std::error::Error>> {
    let start_time = Instant::now();
    println!("🎓 Seeding {} students...", count);

    // One hash shared by every seeded student; bcrypt per row is too slow.
    let password_hash = kurs_core::hash_password(SEED_PASSWORD)
        .map_err(|e| format!("Failed to hash password: {}", e.error))?;
    let students = generate_students(count, &password_hash);

    let mut tx = db.begin().await?;
    let mut ids = Vec::with_capacity(students.len());
    for chunk in students.chunks(BATCH_SIZE) {
        ids.extend(insert_students_chunk(&mut tx, chunk).await?);
    }
    tx.commit().await?;

    println!(
        "   ✓ Inserted {} students in {:?} (password: {})",
        ids.len(),
        start_time.elapsed(),
        SEED_PASSWORD
    );

    Ok(ids)
}

async fn insert_students_chunk(
    tx: &mut Transaction<'_, Postgres>,
    students: &[StudentSeed],
) -> Result<Vec<Uuid>, Box<dyn std::error::Error>> {
    if students.is_empty() {
        return Ok(Vec::new());
    }

    let mut query =
        String::from("INSERT INTO users (user_name, email, password_hash, tel) VALUES ");
    for i in 0..students.len() {
        if i > 0 {
            query.push_str(", ");
        }
        let p = i * 4;
        query.push_str(&format!("(${}, ${}, ${}, ${})", p + 1, p + 2, p + 3, p + 4));
    }
    query.push_str(" ON CONFLICT (email) DO NOTHING RETURNING id");

    let mut q = sqlx::query_scalar(&query);
    for student in students {
        q = q
            .bind(&student.user_name)
            .bind(&student.email)
            .bind(&student.password_hash)
            .bind(student.tel);
    }

    Ok(q.fetch_all(&mut **tx).await?)
}

/// Deletes seeded students and pulls them from every course.
pub async fn clear_students(db: &PgPool) -> Result<u64, Box<dyn std::error::Error>> {
    let pattern = format!("%@{}", SEED_EMAIL_DOMAIN);
    let mut tx = db.begin().await?;

    sqlx::query(
        "UPDATE courses SET students = ARRAY(
             SELECT s FROM unnest(students) AS s
             WHERE s NOT IN (SELECT id FROM users WHERE email LIKE $1)
         )",
    )
    .bind(&pattern)
    .execute(&mut *tx)
    .await?;

    let result = sqlx::query("DELETE FROM users WHERE email LIKE $1")
        .bind(&pattern)
        .execute(&mut *tx)
        .await?
        .rows_affected();
    tx.commit().await?;

    println!("   ✓ Deleted {} seeded students", result);
    Ok(result)
}
