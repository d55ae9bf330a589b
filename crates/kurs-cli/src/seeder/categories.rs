//! Category seeding.

use fake::Fake;
use fake::faker::lorem::en::{Sentence, Word};
use rayon::prelude::*;
use sqlx::{PgPool, Postgres, Transaction};
use std::time::Instant;
use uuid::Uuid;

use super::models::CategorySeed;

/// Generates categories in parallel. Names carry their index so they stay
/// unique.
pub fn generate_categories(count: usize) -> Vec<CategorySeed> {
    (0..count)
        .into_par_iter()
        .map(|idx| {
            let word: String = Word().fake();
            let description: String = Sentence(4..10).fake();

            CategorySeed {
                name: format!("{} {}", capitalize(&word), idx + 1),
                description: Some(description.chars().take(200).collect()),
            }
        })
        .collect()
}

fn capitalize(word: &str) -> String {
    let mut chars = word.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars).collect(),
        None => String::new(),
    }
}

pub async fn seed_categories(
    db: &PgPool,
    count: usize,
) -> Result<Vec<Uuid>, Box<dyn std::error::Error>> {
    let start_time = Instant::now();
    println!("📚 Seeding {} categories...", count);

    let categories = generate_categories(count);
    let mut tx = db.begin().await?;
    let ids = insert_categories_chunk(&mut tx, &categories).await?;
    tx.commit().await?;

    println!(
        "   ✓ Inserted {} categories in {:?}",
        ids.len(),
        start_time.elapsed()
    );

    Ok(ids)
}

async fn insert_categories_chunk(
    tx: &mut Transaction<'_, Postgres>,
    categories: &[CategorySeed],
) -> Result<Vec<Uuid>, Box<dyn std::error::Error>> {
    if categories.is_empty() {
        return Ok(Vec::new());
    }

    let mut query = String::from("INSERT INTO categories (name, description) VALUES ");
    for i in 0..categories.len() {
        if i > 0 {
            query.push_str(", ");
        }
        query.push_str(&format!("(${}, ${})", i * 2 + 1, i * 2 + 2));
    }
    query.push_str(" ON CONFLICT (name) DO NOTHING RETURNING id");

    let mut q = sqlx::query_scalar(&query);
    for category in categories {
        q = q.bind(&category.name).bind(&category.description);
    }

    Ok(q.fetch_all(&mut **tx).await?)
}

/// Deletes every category. Courses keep existing with no category.
pub async fn clear_categories(db: &PgPool) -> Result<u64, Box<dyn std::error::Error>> {
    let result = sqlx::query("DELETE FROM categories")
        .execute(db)
        .await?
        .rows_affected();

    println!("   ✓ Deleted {} categories", result);
    Ok(result)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;

    #[test]
    fn test_generated_names_are_unique_and_fit() {
        let categories = generate_categories(30);
        let names: HashSet<_> = categories.iter().map(|c| c.name.clone()).collect();

        assert_eq!(names.len(), 30);
        assert!(categories.iter().all(|c| c.name.chars().count() <= 50));
        assert!(
            categories
                .iter()
                .all(|c| c.description.as_ref().is_some_and(|d| d.chars().count() <= 200))
        );
    }

    #[test]
    fn test_capitalize() {
        assert_eq!(capitalize("rust"), "Rust");
        assert_eq!(capitalize(""), "");
    }
}
