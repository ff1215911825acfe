//! Comment model and related types

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use utoipa::ToSchema;
use validator::Validate;

/// Comment joined with its author for display
#[derive(Debug, Clone, Serialize, Deserialize, FromRow, ToSchema)]
pub struct CommentDetails {
    pub id: i32,
    pub text: String,
    pub item_id: i32,
    pub author_name: String,
    pub created: DateTime<Utc>,
}

/// Create comment request
#[derive(Debug, Deserialize, Validate, ToSchema)]
pub struct CreateComment {
    #[validate(length(min = 1, message = "Comment text must not be blank"))]
    pub text: String,
}
