use serde::Deserialize;

use crate::error::{RequestError, ValidationError};
use crate::server::constants::MAX_LISTING_ELEMENTS;

pub const DEFAULT_LIMIT: i64 = 10;
pub const DEFAULT_SKIP: i64 = 0;

#[derive(Debug, Deserialize)]
pub struct ListingQuery {
    pub skip: Option<i64>,
    pub limit: Option<i64>,
}

/// Validated offset/limit pair, ready to bind into a query.
#[derive(Clone, Copy, Debug)]
pub struct Listing {
    pub skip: i64,
    pub limit: i64,
}

pub fn validate_skip(skip: i64) -> Result<(), RequestError> {
    if skip < 0 {
        return Err(ValidationError::InvalidInput {
            value: skip.to_string(),
            reason: "skip debe ser >= 0".to_string(),
        }
        .into());
    }
    Ok(())
}

pub fn validate_limit(limit: i64) -> Result<(), RequestError> {
    if limit < 1 {
        return Err(ValidationError::InvalidInput {
            value: limit.to_string(),
            reason: "limit debe ser >= 1".to_string(),
        }
        .into());
    }
    if limit > MAX_LISTING_ELEMENTS {
        return Err(ValidationError::LimitExceeded {
            subject: "limit de listado".to_string(),
            attempted: limit as usize,
            limit: MAX_LISTING_ELEMENTS as usize,
        }
        .into());
    }
    Ok(())
}

impl Listing {
    pub fn from_query(query: ListingQuery) -> Result<Self, RequestError> {
        let skip = query.skip.unwrap_or(DEFAULT_SKIP);
        let limit = query.limit.unwrap_or(DEFAULT_LIMIT);
        validate_skip(skip)?;
        validate_limit(limit)?;
        Ok(Self { skip, limit })
    }
}
