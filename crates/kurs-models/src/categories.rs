use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use utoipa::ToSchema;
use uuid::Uuid;
use validator::Validate;

#[derive(Debug, Clone, PartialEq, Serialize, FromRow, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct Category {
    #[serde(rename = "_id")]
    pub id: Uuid,
    pub name: String,
    pub description: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Category as embedded in a populated course.
#[derive(Debug, Clone, PartialEq, Serialize, FromRow, ToSchema)]
pub struct CategorySummary {
    #[serde(rename = "_id")]
    pub id: Uuid,
    pub name: String,
    pub description: Option<String>,
}

impl From<&Category> for CategorySummary {
    fn from(category: &Category) -> Self {
        Self {
            id: category.id,
            name: category.name.clone(),
            description: category.description.clone(),
        }
    }
}

#[derive(Debug, Clone)]
pub struct NewCategory {
    pub name: String,
    pub description: Option<String>,
}

#[derive(Debug, Clone, Default)]
pub struct CategoryChanges {
    pub name: Option<String>,
    pub description: Option<String>,
}

/// Body of both add-category and update-category. On update every field is
/// optional.
#[derive(Debug, Clone, Deserialize, Validate, ToSchema)]
pub struct CategoryRequest {
    #[validate(length(max = 50, message = "Kategoriya nomi 50 ta belgidan oshmasligi kerak"))]
    #[schema(example = "Dasturlash")]
    pub name: Option<String>,
    #[validate(length(
        max = 200,
        message = "Kategoriya tavsifi 200 ta belgidan oshmasligi kerak"
    ))]
    pub description: Option<String>,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct CategoryPayload {
    pub category: Category,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct CategoriesPayload {
    pub categories: Vec<Category>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_name_length_limit() {
        let dto = CategoryRequest {
            name: Some("x".repeat(51)),
            description: None,
        };
        assert!(dto.validate().is_err());

        let dto = CategoryRequest {
            name: Some("x".repeat(50)),
            description: Some("y".repeat(200)),
        };
        assert!(dto.validate().is_ok());
    }

    #[test]
    fn test_description_length_limit() {
        let dto = CategoryRequest {
            name: Some("Dizayn".to_string()),
            description: Some("y".repeat(201)),
        };
        assert!(dto.validate().is_err());
    }
}
