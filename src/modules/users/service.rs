use tracing::instrument;
use uuid::Uuid;

use kurs_core::AppError;
use kurs_core::password::check_password_policy;
use kurs_models::users::User;

use crate::middleware::auth::USER_NOT_FOUND_MESSAGE;
use crate::state::AppState;
use crate::utils::upload::{ImageUpload, remove_file, store_image};

use super::credentials::{CredentialStore, ProfileChanges};

pub const OLD_PASSWORD_REQUIRED_MESSAGE: &str = "Eski parolni kiritish majburiy";
pub const OLD_PASSWORD_WRONG_MESSAGE: &str = "Eski parol noto'g'ri";

/// Fields read from the `update-user` multipart form.
#[derive(Debug, Default)]
pub struct UpdateUserForm {
    pub user_name: Option<String>,
    pub password: Option<String>,
    pub new_password: Option<String>,
    pub image: Option<ImageUpload>,
}

pub struct UserService;

impl UserService {
    #[instrument(skip(state))]
    pub async fn get_profile(state: &AppState, user_id: Uuid) -> Result<User, AppError> {
        state
            .users
            .find_by_id(user_id)
            .await?
            .map(User::from)
            .ok_or_else(|| AppError::not_found(USER_NOT_FOUND_MESSAGE))
    }

    #[instrument(skip(state, form), fields(has_image = form.image.is_some()))]
    pub async fn update_user(
        state: &AppState,
        user_id: Uuid,
        form: UpdateUserForm,
    ) -> Result<User, AppError> {
        let credentials = CredentialStore::new(state.users.clone());
        let record = credentials
            .find_by_id(user_id)
            .await?
            .ok_or_else(|| AppError::not_found(USER_NOT_FOUND_MESSAGE))?;

        let mut changes = ProfileChanges {
            user_name: form
                .user_name
                .map(|name| name.trim().to_string())
                .filter(|name| !name.is_empty()),
            ..Default::default()
        };

        if let Some(new_password) = form.new_password.filter(|p| !p.is_empty()) {
            let Some(old_password) = form.password.filter(|p| !p.is_empty()) else {
                return Err(AppError::unauthorized(OLD_PASSWORD_REQUIRED_MESSAGE));
            };
            if !credentials.verify(&record, &old_password) {
                tracing::warn!(security.event = "password_change_rejected", user.id = %user_id);
                return Err(AppError::unauthorized(OLD_PASSWORD_WRONG_MESSAGE));
            }
            check_password_policy(&new_password)?;
            changes.password = Some(new_password);
        }

        // Everything that can reject the request is checked before the
        // image is written.
        if let Some(image) = form.image {
            let stored_name = store_image(
                state.files.as_ref(),
                &image,
                state.upload_config.max_file_size,
            )
            .await?;
            changes.image = Some(stored_name);
        }

        let new_image = changes.image.clone();
        let updated = match credentials.save(user_id, changes).await {
            Ok(Some(updated)) => updated,
            result => {
                if let Some(uploaded) = new_image.as_deref() {
                    remove_file(state.files.as_ref(), uploaded).await;
                }
                return Err(match result {
                    Err(err) => err,
                    _ => AppError::not_found(USER_NOT_FOUND_MESSAGE),
                });
            }
        };

        if let (Some(previous), Some(current)) = (record.image.as_deref(), new_image.as_deref()) {
            if previous != current {
                remove_file(state.files.as_ref(), previous).await;
            }
        }

        tracing::info!(user.id = %user_id, "User updated");
        Ok(User::from(updated))
    }
}
