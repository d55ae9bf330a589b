use tracing::instrument;
use uuid::Uuid;

use kurs_core::AppError;
use kurs_models::categories::{Category, CategoryChanges, CategoryRequest, NewCategory};

use crate::store::{CategoryStore, DUPLICATE_CATEGORY_MESSAGE};

pub const CATEGORY_NAME_REQUIRED_MESSAGE: &str = "Kategoriya nomi kiritilishi shart";
pub const INVALID_CATEGORY_ID_MESSAGE: &str = "Noto'g'ri kategoriya ID";
pub const CATEGORY_NOT_FOUND_MESSAGE: &str = "Kategoriya topilmadi";

pub struct CategoryService;

impl CategoryService {
    #[instrument(skip(store))]
    pub async fn create_category(
        store: &dyn CategoryStore,
        dto: CategoryRequest,
    ) -> Result<Category, AppError> {
        let name = dto
            .name
            .map(|n| n.trim().to_string())
            .filter(|n| !n.is_empty())
            .ok_or_else(|| AppError::bad_request(CATEGORY_NAME_REQUIRED_MESSAGE))?;

        if store.find_by_name(&name).await?.is_some() {
            return Err(AppError::conflict(DUPLICATE_CATEGORY_MESSAGE));
        }

        let category = store
            .insert(NewCategory {
                name,
                description: dto.description,
            })
            .await?;

        tracing::info!(category.id = %category.id, "Category created");
        Ok(category)
    }

    #[instrument(skip(store))]
    pub async fn get_categories(store: &dyn CategoryStore) -> Result<Vec<Category>, AppError> {
        store.list().await
    }

    #[instrument(skip(store))]
    pub async fn update_category(
        store: &dyn CategoryStore,
        id: Uuid,
        dto: CategoryRequest,
    ) -> Result<Category, AppError> {
        store
            .find_by_id(id)
            .await?
            .ok_or_else(|| AppError::not_found(CATEGORY_NOT_FOUND_MESSAGE))?;

        let name = match dto.name.map(|n| n.trim().to_string()) {
            Some(name) if name.is_empty() => {
                return Err(AppError::bad_request(CATEGORY_NAME_REQUIRED_MESSAGE));
            }
            Some(name) => {
                if let Some(existing) = store.find_by_name(&name).await? {
                    if existing.id != id {
                        return Err(AppError::conflict(DUPLICATE_CATEGORY_MESSAGE));
                    }
                }
                Some(name)
            }
            None => None,
        };

        store
            .update(
                id,
                CategoryChanges {
                    name,
                    description: dto.description,
                },
            )
            .await?
            .ok_or_else(|| AppError::not_found(CATEGORY_NOT_FOUND_MESSAGE))
    }

    /// Courses in the category keep existing with no category.
    #[instrument(skip(store))]
    pub async fn delete_category(store: &dyn CategoryStore, id: Uuid) -> Result<(), AppError> {
        if !store.delete(id).await? {
            return Err(AppError::not_found(CATEGORY_NOT_FOUND_MESSAGE));
        }
        tracing::info!(category.id = %id, "Category deleted");
        Ok(())
    }
}
