//! Admin account creation.

use kurs_core::hash_password;
use kurs_core::password::check_password_policy;
use kurs_models::users::UserRole;
use sqlx::PgPool;
use uuid::Uuid;

/// Input for [`create_admin`], with the plaintext password.
pub struct NewAdmin {
    pub user_name: String,
    pub email: String,
    pub password: String,
    pub tel: i64,
}

/// Inserts a user with the `admin` role. Fails when the email is taken or
/// the password does not meet the policy enforced by the API.
pub async fn create_admin(
    db: &PgPool,
    admin: &NewAdmin,
) -> Result<Uuid, Box<dyn std::error::Error>> {
    check_password_policy(&admin.password).map_err(|e| e.error.to_string())?;
    let password_hash = hash_password(&admin.password)
        .map_err(|e| format!("Failed to hash password: {}", e.error))?;

    let email = admin.email.trim().to_lowercase();

    let user_id = sqlx::query_scalar::<_, Uuid>(
        "INSERT INTO users (user_name, email, password_hash, tel, role)
         VALUES ($1, $2, $3, $4, $5)
         ON CONFLICT (email) DO NOTHING
         RETURNING id",
    )
    .bind(admin.user_name.trim())
    .bind(&email)
    .bind(&password_hash)
    .bind(admin.tel)
    .bind(UserRole::Admin)
    .fetch_optional(db)
    .await?;

    user_id.ok_or_else(|| "User with this email already exists".into())
}
