//! Item request (bulletin board) endpoints

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    Json,
};
use validator::Validate;

use crate::{
    error::AppResult,
    models::request::{CreateRequest, ItemRequest, RequestDetails, RequestQuery},
};

use super::SharerId;

/// Post an open request for an item not yet listed
#[utoipa::path(
    post,
    path = "/requests",
    tag = "requests",
    request_body = CreateRequest,
    params(
        ("X-Sharer-User-Id" = i32, Header, description = "Caller user ID")
    ),
    responses(
        (status = 201, description = "Request created", body = ItemRequest),
        (status = 400, description = "Invalid input"),
        (status = 404, description = "User not found")
    )
)]
pub async fn create_request(
    State(state): State<crate::AppState>,
    SharerId(caller_id): SharerId,
    Json(payload): Json<CreateRequest>,
) -> AppResult<(StatusCode, Json<ItemRequest>)> {
    payload.validate()?;

    let request = state.services.requests.create_request(payload, caller_id).await?;
    Ok((StatusCode::CREATED, Json(request)))
}

/// List the caller's own requests with answering items
#[utoipa::path(
    get,
    path = "/requests",
    tag = "requests",
    params(
        ("X-Sharer-User-Id" = i32, Header, description = "Caller user ID")
    ),
    responses(
        (status = 200, description = "The caller's requests", body = Vec<RequestDetails>),
        (status = 404, description = "User not found")
    )
)]
pub async fn list_own_requests(
    State(state): State<crate::AppState>,
    SharerId(caller_id): SharerId,
) -> AppResult<Json<Vec<RequestDetails>>> {
    let requests = state.services.requests.get_own_requests(caller_id).await?;
    Ok(Json(requests))
}

/// List requests posted by other users, paged
#[utoipa::path(
    get,
    path = "/requests/all",
    tag = "requests",
    params(
        RequestQuery,
        ("X-Sharer-User-Id" = i32, Header, description = "Caller user ID")
    ),
    responses(
        (status = 200, description = "Other users' requests", body = Vec<RequestDetails>),
        (status = 400, description = "Invalid page"),
        (status = 404, description = "User not found")
    )
)]
pub async fn list_other_requests(
    State(state): State<crate::AppState>,
    SharerId(caller_id): SharerId,
    Query(query): Query<RequestQuery>,
) -> AppResult<Json<Vec<RequestDetails>>> {
    let (from, size) = query.resolve()?;

    let requests = state
        .services
        .requests
        .get_other_requests(caller_id, from, size)
        .await?;
    Ok(Json(requests))
}

/// Get a request with its answering items
#[utoipa::path(
    get,
    path = "/requests/{id}",
    tag = "requests",
    params(
        ("id" = i32, Path, description = "Request ID"),
        ("X-Sharer-User-Id" = i32, Header, description = "Caller user ID")
    ),
    responses(
        (status = 200, description = "Request details", body = RequestDetails),
        (status = 404, description = "Request or user not found")
    )
)]
pub async fn get_request(
    State(state): State<crate::AppState>,
    SharerId(caller_id): SharerId,
    Path(request_id): Path<i32>,
) -> AppResult<Json<RequestDetails>> {
    let request = state.services.requests.get_request(request_id, caller_id).await?;
    Ok(Json(request))
}
