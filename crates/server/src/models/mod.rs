use serde::Serialize;

use crate::error::ValidationError;

pub mod category;
pub mod listing;
pub mod resource;
pub mod tag;

/// Body of confirmation and welcome responses: `{"message": "..."}`.
#[derive(Clone, Debug, Serialize)]
pub struct MessageResponse {
    pub message: String,
}

impl MessageResponse {
    pub fn new(message: &str) -> Self {
        Self {
            message: message.to_string(),
        }
    }
}

pub fn validate_required_field(field: &'static str, value: &str) -> Result<(), ValidationError> {
    if value.trim().is_empty() {
        return Err(ValidationError::EmptyField { field });
    }
    Ok(())
}
