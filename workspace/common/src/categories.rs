use model::entities::category::{self, CategoryType};
use serde::{Deserialize, Serialize};
use utoipa::{IntoParams, ToSchema};
use validator::Validate;

/// Request for creating a category.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema, Validate, PartialEq)]
pub struct CreateCategoryRequest {
    /// Unique category name
    #[validate(length(min = 1, max = 100))]
    pub name: String,
    pub category_type: CategoryType,
    #[validate(length(max = 500))]
    pub description: Option<String>,
}

/// Request for updating a category. Absent fields are left unchanged.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema, Validate, PartialEq, Default)]
pub struct UpdateCategoryRequest {
    #[validate(length(min = 1, max = 100))]
    pub name: Option<String>,
    pub category_type: Option<CategoryType>,
    #[validate(length(max = 500))]
    pub description: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema, IntoParams, Validate, Default)]
pub struct CategoryQuery {
    /// Only categories of this type
    pub category_type: Option<CategoryType>,
}

/// Category response model.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema, PartialEq)]
pub struct CategoryDto {
    pub id: i32,
    pub name: String,
    pub category_type: CategoryType,
    pub description: Option<String>,
}

impl From<category::Model> for CategoryDto {
    fn from(model: category::Model) -> Self {
        Self {
            id: model.id,
            name: model.name,
            category_type: model.category_type,
            description: model.description,
        }
    }
}
