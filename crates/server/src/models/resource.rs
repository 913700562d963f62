use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};

use crate::error::ValidationError;
use crate::models::listing::Listing;
use crate::models::tag::TagResponse;
use crate::models::validate_required_field;

pub type ResourceId = i64;

pub const DEFAULT_STATUS: &str = "pending";
const TITLE_LENGTH_LIMIT: usize = 200;
const TAG_NAME_LENGTH_LIMIT: usize = 50;
const MAX_TAGS_PER_RESOURCE: usize = 32;

#[derive(Clone, Debug, Deserialize)]
pub struct CreateResourceRequest {
    pub title: String,
    pub description: String,
    pub url: String,
    #[serde(default)]
    pub image: Option<String>,
    #[serde(default = "default_status")]
    pub status: String,
    #[serde(default)]
    pub tags: Vec<String>,
}

fn default_status() -> String {
    DEFAULT_STATUS.to_string()
}

#[derive(Clone, Debug, sqlx::FromRow)]
pub struct ResourceRow {
    pub id: ResourceId,
    pub title: String,
    pub description: String,
    pub url: String,
    pub image: Option<String>,
    pub status: String,
    pub created_at: NaiveDateTime,
    pub updated_at: Option<NaiveDateTime>,
}

#[derive(Clone, Debug, Serialize)]
pub struct ResourceResponse {
    pub id: ResourceId,
    pub title: String,
    pub description: String,
    pub url: String,
    pub image: Option<String>,
    pub status: String,
    pub tags: Vec<TagResponse>,
    pub created_at: NaiveDateTime,
    pub updated_at: Option<NaiveDateTime>,
}

impl ResourceResponse {
    pub fn from_row(row: ResourceRow, tags: Vec<TagResponse>) -> Self {
        Self {
            id: row.id,
            title: row.title,
            description: row.description,
            url: row.url,
            image: row.image,
            status: row.status,
            tags,
            created_at: row.created_at,
            updated_at: row.updated_at,
        }
    }
}

#[derive(Clone, Debug)]
pub struct ResourceSearch {
    pub query: Option<String>,
    pub tag: Option<String>,
    pub listing: Listing,
}

/// Search results carry the full match count so clients can paginate; the
/// `recursos` field name is part of the public response shape.
#[derive(Clone, Debug, Serialize)]
pub struct SearchResourcesResponse {
    pub total: i64,
    pub recursos: Vec<ResourceResponse>,
    pub skip: i64,
    pub limit: i64,
}

pub fn validate_create_resource(request: &CreateResourceRequest) -> Result<(), ValidationError> {
    validate_required_field("title", &request.title)?;
    validate_required_field("description", &request.description)?;
    validate_required_field("url", &request.url)?;
    if request.title.len() > TITLE_LENGTH_LIMIT {
        return Err(ValidationError::InvalidInput {
            value: request.title.clone(),
            reason: format!("el título no puede superar {TITLE_LENGTH_LIMIT} caracteres"),
        });
    }
    if request.tags.len() > MAX_TAGS_PER_RESOURCE {
        return Err(ValidationError::LimitExceeded {
            subject: "tags por recurso".to_string(),
            attempted: request.tags.len(),
            limit: MAX_TAGS_PER_RESOURCE,
        });
    }
    for name in &request.tags {
        validate_tag_name(name)?;
    }
    Ok(())
}

pub fn validate_tag_name(name: &str) -> Result<(), ValidationError> {
    if name.trim().is_empty() {
        return Err(ValidationError::InvalidInput {
            value: name.to_string(),
            reason: "el nombre del tag no puede estar vacío".to_string(),
        });
    }
    if name.len() > TAG_NAME_LENGTH_LIMIT {
        return Err(ValidationError::InvalidInput {
            value: name.to_string(),
            reason: format!("el nombre del tag no puede superar {TAG_NAME_LENGTH_LIMIT} caracteres"),
        });
    }
    Ok(())
}
