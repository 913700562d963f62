use serde::{Deserialize, Serialize};
use sqlx::types::Json;

use crate::error::ValidationError;
use crate::models::validate_required_field;

pub type CategoryId = i64;

#[derive(Clone, Debug, Deserialize)]
pub struct CreateCategoryRequest {
    pub name: String,
    pub icon: String,
    pub tags: Vec<String>,
    #[serde(default)]
    pub parent_id: Option<CategoryId>,
}

/// The `tags` column holds a JSON array of free-form strings, independent of
/// the `tags` table.
#[derive(Clone, Debug, sqlx::FromRow)]
pub struct CategoryRow {
    pub id: CategoryId,
    pub name: String,
    pub icon: String,
    pub tags: Json<Vec<String>>,
    pub parent_id: Option<CategoryId>,
}

#[derive(Clone, Debug, Serialize)]
pub struct CategoryResponse {
    pub id: CategoryId,
    pub name: String,
    pub icon: String,
    pub tags: Vec<String>,
    pub parent_id: Option<CategoryId>,
}

impl From<CategoryRow> for CategoryResponse {
    fn from(row: CategoryRow) -> Self {
        Self {
            id: row.id,
            name: row.name,
            icon: row.icon,
            tags: row.tags.0,
            parent_id: row.parent_id,
        }
    }
}

pub fn validate_create_category(request: &CreateCategoryRequest) -> Result<(), ValidationError> {
    validate_required_field("name", &request.name)
}
