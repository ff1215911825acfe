//! Item request (bulletin board) model and related types

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use utoipa::{IntoParams, ToSchema};
use validator::Validate;

use super::item::Item;
use crate::error::AppResult;

/// Item request model from database
#[derive(Debug, Clone, Serialize, Deserialize, FromRow, ToSchema)]
pub struct ItemRequest {
    pub id: i32,
    pub description: String,
    pub requester_id: i32,
    pub created: DateTime<Utc>,
}

/// Item request with the items listed in answer to it
#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct RequestDetails {
    pub id: i32,
    pub description: String,
    pub created: DateTime<Utc>,
    pub items: Vec<Item>,
}

impl RequestDetails {
    pub fn new(request: ItemRequest, items: Vec<Item>) -> Self {
        RequestDetails {
            id: request.id,
            description: request.description,
            created: request.created,
            items,
        }
    }
}

/// Create item request payload
#[derive(Debug, Deserialize, Validate, ToSchema)]
pub struct CreateRequest {
    #[validate(length(min = 1, message = "Description must not be blank"))]
    pub description: String,
}

/// Request list query parameters
#[derive(Debug, Deserialize, IntoParams)]
pub struct RequestQuery {
    pub from: Option<i64>,
    pub size: Option<i64>,
}

impl RequestQuery {
    /// Resolve defaults (`from=0`, `size=10`) and validate the page
    pub fn resolve(&self) -> AppResult<(i64, i64)> {
        let from = self.from.unwrap_or(0);
        let size = self.size.unwrap_or(10);
        super::booking::check_page(from, size)?;
        Ok((from, size))
    }
}
