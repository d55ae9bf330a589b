//! Password-aware persistence for users.
//!
//! Every write that carries a plaintext password goes through
//! [`CredentialStore`], which checks the password policy and hashes it.
//! Saves that leave the password alone never touch the stored hash.

use std::sync::Arc;

use chrono::Utc;
use tracing::instrument;
use uuid::Uuid;

use kurs_auth::ResetCode;
use kurs_core::password::check_password_policy;
use kurs_core::{AppError, hash_password, verify_password};
use kurs_models::users::{NewUser, UserChanges, UserRecord, UserRole};

use crate::store::UserStore;

/// A user about to be created, with the plaintext password.
#[derive(Debug, Clone)]
pub struct Registration {
    pub user_name: String,
    pub email: String,
    pub password: String,
    pub tel: i64,
    /// Stored name of an already saved avatar.
    pub image: Option<String>,
    pub role: UserRole,
}

/// Partial profile update. `password` is the new plaintext password.
#[derive(Debug, Clone, Default)]
pub struct ProfileChanges {
    pub user_name: Option<String>,
    pub password: Option<String>,
    pub image: Option<String>,
    pub role: Option<UserRole>,
}

#[derive(Clone)]
pub struct CredentialStore {
    users: Arc<dyn UserStore>,
}

impl CredentialStore {
    pub fn new(users: Arc<dyn UserStore>) -> Self {
        Self { users }
    }

    pub async fn find_by_id(&self, id: Uuid) -> Result<Option<UserRecord>, AppError> {
        self.users.find_by_id(id).await
    }

    pub async fn find_by_email(&self, email: &str) -> Result<Option<UserRecord>, AppError> {
        self.users.find_by_email(email).await
    }

    #[instrument(skip(self, registration), fields(user.email = %registration.email))]
    pub async fn create(&self, registration: Registration) -> Result<UserRecord, AppError> {
        check_password_policy(&registration.password)?;
        let password_hash = hash_password(&registration.password)?;

        self.users
            .insert(NewUser {
                user_name: registration.user_name,
                email: registration.email,
                password_hash,
                tel: registration.tel,
                image: registration.image,
                role: registration.role,
            })
            .await
    }

    /// Applies `changes`, hashing the password only when one is given.
    #[instrument(skip(self, changes))]
    pub async fn save(
        &self,
        id: Uuid,
        changes: ProfileChanges,
    ) -> Result<Option<UserRecord>, AppError> {
        let password_hash = match changes.password {
            Some(password) => {
                check_password_policy(&password)?;
                Some(hash_password(&password)?)
            }
            None => None,
        };

        self.users
            .update(
                id,
                UserChanges {
                    user_name: changes.user_name,
                    password_hash,
                    image: changes.image,
                    role: changes.role,
                },
            )
            .await
    }

    /// `false` on mismatch and on a malformed stored hash.
    pub fn verify(&self, record: &UserRecord, plaintext: &str) -> bool {
        match verify_password(plaintext, &record.password_hash) {
            Ok(valid) => valid,
            Err(err) => {
                tracing::warn!(user.id = %record.id, error = ?err.error, "Stored hash could not be checked");
                false
            }
        }
    }

    /// Generates a fresh code and persists it, replacing any earlier one.
    #[instrument(skip(self, record), fields(user.id = %record.id))]
    pub async fn issue_reset_code(&self, record: &UserRecord) -> Result<ResetCode, AppError> {
        let reset_code = ResetCode::generate();
        self.users
            .set_reset_code(record.id, &reset_code.code, reset_code.expires_at)
            .await?;
        Ok(reset_code)
    }

    /// Checks the policy for `new_password`, then redeems `code` in a single
    /// conditional update. `None` when the code is wrong or expired.
    #[instrument(skip(self, code, new_password))]
    pub async fn redeem_reset_code(
        &self,
        email: &str,
        code: &str,
        new_password: &str,
    ) -> Result<Option<UserRecord>, AppError> {
        check_password_policy(new_password)?;
        let password_hash = hash_password(new_password)?;

        self.users
            .redeem_reset_code(email, code, Utc::now(), &password_hash)
            .await
    }
}
