//! Booking lifecycle endpoints

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    Json,
};
use serde::Deserialize;
use utoipa::IntoParams;

use crate::{
    error::AppResult,
    models::booking::{BookingDetails, BookingQuery, CreateBooking},
};

use super::SharerId;

/// Approval decision query parameter
#[derive(Debug, Deserialize, IntoParams)]
pub struct ApproveQuery {
    pub approved: bool,
}

/// Book an item for a time window
#[utoipa::path(
    post,
    path = "/bookings",
    tag = "bookings",
    request_body = CreateBooking,
    params(
        ("X-Sharer-User-Id" = i32, Header, description = "Caller user ID")
    ),
    responses(
        (status = 201, description = "Booking created in WAITING status", body = BookingDetails),
        (status = 400, description = "Invalid time window or item unavailable"),
        (status = 404, description = "Item or user not found")
    )
)]
pub async fn create_booking(
    State(state): State<crate::AppState>,
    SharerId(caller_id): SharerId,
    Json(payload): Json<CreateBooking>,
) -> AppResult<(StatusCode, Json<BookingDetails>)> {
    tracing::debug!("create_booking {:?} from user {}", payload, caller_id);

    let booking = state.services.bookings.create_booking(payload, caller_id).await?;
    Ok((StatusCode::CREATED, Json(booking)))
}

/// Approve or reject a waiting booking (item owner only)
#[utoipa::path(
    patch,
    path = "/bookings/{id}",
    tag = "bookings",
    params(
        ("id" = i32, Path, description = "Booking ID"),
        ("approved" = bool, Query, description = "true to approve, false to reject"),
        ("X-Sharer-User-Id" = i32, Header, description = "Caller user ID")
    ),
    responses(
        (status = 200, description = "Booking decided", body = BookingDetails),
        (status = 400, description = "Booking is not awaiting a decision"),
        (status = 404, description = "Booking not found")
    )
)]
pub async fn approve_booking(
    State(state): State<crate::AppState>,
    SharerId(caller_id): SharerId,
    Path(booking_id): Path<i32>,
    Query(query): Query<ApproveQuery>,
) -> AppResult<Json<BookingDetails>> {
    tracing::debug!(
        "approve_booking {} approved={} from user {}",
        booking_id,
        query.approved,
        caller_id
    );

    let booking = state
        .services
        .bookings
        .approve_booking(booking_id, query.approved, caller_id)
        .await?;
    Ok(Json(booking))
}

/// Get a booking (visible to its booker and the item owner)
#[utoipa::path(
    get,
    path = "/bookings/{id}",
    tag = "bookings",
    params(
        ("id" = i32, Path, description = "Booking ID"),
        ("X-Sharer-User-Id" = i32, Header, description = "Caller user ID")
    ),
    responses(
        (status = 200, description = "Booking details", body = BookingDetails),
        (status = 404, description = "Booking not found")
    )
)]
pub async fn get_booking(
    State(state): State<crate::AppState>,
    SharerId(caller_id): SharerId,
    Path(booking_id): Path<i32>,
) -> AppResult<Json<BookingDetails>> {
    let booking = state.services.bookings.get_booking(booking_id, caller_id).await?;
    Ok(Json(booking))
}

/// List the caller's bookings filtered by state
#[utoipa::path(
    get,
    path = "/bookings",
    tag = "bookings",
    params(
        BookingQuery,
        ("X-Sharer-User-Id" = i32, Header, description = "Caller user ID")
    ),
    responses(
        (status = 200, description = "Bookings made by the caller", body = Vec<BookingDetails>),
        (status = 400, description = "Invalid state or page"),
        (status = 404, description = "User not found")
    )
)]
pub async fn list_by_booker(
    State(state): State<crate::AppState>,
    SharerId(caller_id): SharerId,
    Query(query): Query<BookingQuery>,
) -> AppResult<Json<Vec<BookingDetails>>> {
    let (booking_state, from, size) = query.resolve()?;

    let bookings = state
        .services
        .bookings
        .list_by_booker(caller_id, booking_state, from, size)
        .await?;
    Ok(Json(bookings))
}

/// List bookings across the caller's items filtered by state
#[utoipa::path(
    get,
    path = "/bookings/owner",
    tag = "bookings",
    params(
        BookingQuery,
        ("X-Sharer-User-Id" = i32, Header, description = "Caller user ID")
    ),
    responses(
        (status = 200, description = "Bookings on the caller's items", body = Vec<BookingDetails>),
        (status = 400, description = "Invalid state or page"),
        (status = 404, description = "User not found")
    )
)]
pub async fn list_by_item_owner(
    State(state): State<crate::AppState>,
    SharerId(caller_id): SharerId,
    Query(query): Query<BookingQuery>,
) -> AppResult<Json<Vec<BookingDetails>>> {
    let (booking_state, from, size) = query.resolve()?;

    let bookings = state
        .services
        .bookings
        .list_by_item_owner(caller_id, booking_state, from, size)
        .await?;
    Ok(Json(bookings))
}
