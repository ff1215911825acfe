//! Item (catalog entry) model and related types

use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use utoipa::{IntoParams, ToSchema};
use validator::Validate;

use super::booking::BookingBrief;
use super::comment::CommentDetails;

/// Item model from database
#[derive(Debug, Clone, Serialize, Deserialize, FromRow, ToSchema)]
pub struct Item {
    pub id: i32,
    pub name: String,
    pub description: String,
    pub available: bool,
    pub owner_id: i32,
    /// Open request this item was listed in answer to, if any
    pub request_id: Option<i32>,
}

/// Short item representation embedded in other responses
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct ItemShort {
    pub id: i32,
    pub name: String,
}

/// Item with comments and, for the owner, its surrounding bookings.
///
/// `last_booking` and `next_booking` are only populated when the caller
/// owns the item; other callers see `null` for both.
#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct ItemDetails {
    pub id: i32,
    pub name: String,
    pub description: String,
    pub available: bool,
    pub last_booking: Option<BookingBrief>,
    pub next_booking: Option<BookingBrief>,
    pub comments: Vec<CommentDetails>,
}

impl ItemDetails {
    pub fn new(
        item: Item,
        last_booking: Option<BookingBrief>,
        next_booking: Option<BookingBrief>,
        comments: Vec<CommentDetails>,
    ) -> Self {
        ItemDetails {
            id: item.id,
            name: item.name,
            description: item.description,
            available: item.available,
            last_booking,
            next_booking,
            comments,
        }
    }
}

/// Create item request
#[derive(Debug, Deserialize, Validate, ToSchema)]
pub struct CreateItem {
    #[validate(length(min = 1, message = "Name must not be blank"))]
    pub name: String,
    #[validate(length(min = 1, message = "Description must not be blank"))]
    pub description: String,
    pub available: bool,
    /// Request this item answers, if any
    pub request_id: Option<i32>,
}

/// Update item request, all fields optional
#[derive(Debug, Deserialize, Validate, ToSchema)]
pub struct UpdateItem {
    #[validate(length(min = 1, message = "Name must not be blank"))]
    pub name: Option<String>,
    #[validate(length(min = 1, message = "Description must not be blank"))]
    pub description: Option<String>,
    pub available: Option<bool>,
}

/// Free-text search query parameters
#[derive(Debug, Deserialize, IntoParams)]
pub struct SearchQuery {
    pub text: Option<String>,
}
