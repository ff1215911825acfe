//! Item catalog endpoints

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    Json,
};
use validator::Validate;

use crate::{
    error::AppResult,
    models::comment::{CommentDetails, CreateComment},
    models::item::{CreateItem, Item, ItemDetails, SearchQuery, UpdateItem},
};

use super::SharerId;

/// List a new item owned by the caller
#[utoipa::path(
    post,
    path = "/items",
    tag = "items",
    request_body = CreateItem,
    params(
        ("X-Sharer-User-Id" = i32, Header, description = "Caller user ID")
    ),
    responses(
        (status = 201, description = "Item created", body = Item),
        (status = 400, description = "Invalid input"),
        (status = 404, description = "Owner or request not found")
    )
)]
pub async fn create_item(
    State(state): State<crate::AppState>,
    SharerId(caller_id): SharerId,
    Json(payload): Json<CreateItem>,
) -> AppResult<(StatusCode, Json<Item>)> {
    payload.validate()?;

    let item = state.services.items.create_item(payload, caller_id).await?;
    Ok((StatusCode::CREATED, Json(item)))
}

/// Edit an item (owner only)
#[utoipa::path(
    patch,
    path = "/items/{id}",
    tag = "items",
    params(
        ("id" = i32, Path, description = "Item ID"),
        ("X-Sharer-User-Id" = i32, Header, description = "Caller user ID")
    ),
    request_body = UpdateItem,
    responses(
        (status = 200, description = "Item updated", body = Item),
        (status = 404, description = "Item not found")
    )
)]
pub async fn update_item(
    State(state): State<crate::AppState>,
    SharerId(caller_id): SharerId,
    Path(item_id): Path<i32>,
    Json(payload): Json<UpdateItem>,
) -> AppResult<Json<Item>> {
    payload.validate()?;

    let item = state.services.items.update_item(item_id, payload, caller_id).await?;
    Ok(Json(item))
}

/// Get an item with comments; the owner also sees last/next bookings
#[utoipa::path(
    get,
    path = "/items/{id}",
    tag = "items",
    params(
        ("id" = i32, Path, description = "Item ID"),
        ("X-Sharer-User-Id" = i32, Header, description = "Caller user ID")
    ),
    responses(
        (status = 200, description = "Item details", body = ItemDetails),
        (status = 404, description = "Item not found")
    )
)]
pub async fn get_item(
    State(state): State<crate::AppState>,
    SharerId(caller_id): SharerId,
    Path(item_id): Path<i32>,
) -> AppResult<Json<ItemDetails>> {
    let item = state.services.items.get_item(item_id, caller_id).await?;
    Ok(Json(item))
}

/// List the caller's own items with their last/next bookings
#[utoipa::path(
    get,
    path = "/items",
    tag = "items",
    params(
        ("X-Sharer-User-Id" = i32, Header, description = "Caller user ID")
    ),
    responses(
        (status = 200, description = "The caller's items", body = Vec<ItemDetails>)
    )
)]
pub async fn list_own_items(
    State(state): State<crate::AppState>,
    SharerId(caller_id): SharerId,
) -> AppResult<Json<Vec<ItemDetails>>> {
    let items = state.services.items.get_all_by_owner(caller_id).await?;
    Ok(Json(items))
}

/// Free-text search over available items
#[utoipa::path(
    get,
    path = "/items/search",
    tag = "items",
    params(
        SearchQuery,
        ("X-Sharer-User-Id" = i32, Header, description = "Caller user ID")
    ),
    responses(
        (status = 200, description = "Matching available items", body = Vec<Item>)
    )
)]
pub async fn search_items(
    State(state): State<crate::AppState>,
    SharerId(_caller_id): SharerId,
    Query(query): Query<SearchQuery>,
) -> AppResult<Json<Vec<Item>>> {
    let items = state
        .services
        .items
        .search(query.text.as_deref().unwrap_or(""))
        .await?;
    Ok(Json(items))
}

/// Comment on an item after a completed booking
#[utoipa::path(
    post,
    path = "/items/{id}/comment",
    tag = "items",
    params(
        ("id" = i32, Path, description = "Item ID"),
        ("X-Sharer-User-Id" = i32, Header, description = "Caller user ID")
    ),
    request_body = CreateComment,
    responses(
        (status = 200, description = "Comment created", body = CommentDetails),
        (status = 400, description = "No completed booking by the caller")
    )
)]
pub async fn add_comment(
    State(state): State<crate::AppState>,
    SharerId(caller_id): SharerId,
    Path(item_id): Path<i32>,
    Json(payload): Json<CreateComment>,
) -> AppResult<Json<CommentDetails>> {
    payload.validate()?;

    let comment = state.services.items.add_comment(item_id, payload, caller_id).await?;
    Ok(Json(comment))
}
