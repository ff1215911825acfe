//! Booking model, lifecycle status, and read-time query filters.
//!
//! A booking is the time-bounded claim of one user (the booker) on another
//! user's item. It is created `WAITING` and moved exactly once to
//! `APPROVED` or `REJECTED` by the item's owner; there are no further
//! transitions and no deletion. Whether a booking is "current", "past" or
//! "future" is never stored: it is computed against the clock at read time.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::{Decode, Encode, FromRow, Postgres};
use utoipa::{IntoParams, ToSchema};

use super::item::ItemShort;
use super::user::UserShort;
use crate::error::{AppError, AppResult};

/// Booking lifecycle status. `Waiting` is the only non-terminal value.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "UPPERCASE")]
pub enum BookingStatus {
    Waiting,
    Approved,
    Rejected,
}

impl BookingStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            BookingStatus::Waiting => "WAITING",
            BookingStatus::Approved => "APPROVED",
            BookingStatus::Rejected => "REJECTED",
        }
    }
}

impl std::fmt::Display for BookingStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl std::str::FromStr for BookingStatus {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "WAITING" => Ok(BookingStatus::Waiting),
            "APPROVED" => Ok(BookingStatus::Approved),
            "REJECTED" => Ok(BookingStatus::Rejected),
            _ => Err(format!("Invalid booking status: {}", s)),
        }
    }
}

// SQLx conversion for BookingStatus, persisted as TEXT
impl sqlx::Type<Postgres> for BookingStatus {
    fn type_info() -> sqlx::postgres::PgTypeInfo {
        <String as sqlx::Type<Postgres>>::type_info()
    }

    fn compatible(ty: &sqlx::postgres::PgTypeInfo) -> bool {
        <String as sqlx::Type<Postgres>>::compatible(ty)
    }
}

impl<'r> Decode<'r, Postgres> for BookingStatus {
    fn decode(value: sqlx::postgres::PgValueRef<'r>) -> Result<Self, sqlx::error::BoxDynError> {
        let s: String = Decode::<Postgres>::decode(value)?;
        s.parse().map_err(|e: String| e.into())
    }
}

impl Encode<'_, Postgres> for BookingStatus {
    fn encode_by_ref(&self, buf: &mut sqlx::postgres::PgArgumentBuffer) -> sqlx::encode::IsNull {
        let s: String = self.as_str().to_string();
        <String as Encode<Postgres>>::encode(s, buf)
    }
}

/// Read-time filter over bookings, relative to the clock. Never persisted.
///
/// `Current` brackets the instant strictly on both sides: a booking whose
/// start or end equals "now" is in neither `Current` nor `Future`/`Past`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize, ToSchema)]
#[serde(rename_all = "UPPERCASE")]
pub enum BookingState {
    #[default]
    All,
    Current,
    Past,
    Future,
    Waiting,
    Rejected,
}

/// Booking row joined with its item and booker
#[derive(Debug, Clone, FromRow)]
pub struct Booking {
    pub id: i32,
    pub start_date: DateTime<Utc>,
    pub end_date: DateTime<Utc>,
    pub status: BookingStatus,
    pub item_id: i32,
    pub item_name: String,
    pub item_owner_id: i32,
    pub booker_id: i32,
    pub booker_name: String,
}

/// Booking with embedded item and booker for display
#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct BookingDetails {
    pub id: i32,
    pub start_date: DateTime<Utc>,
    pub end_date: DateTime<Utc>,
    pub status: BookingStatus,
    pub item: ItemShort,
    pub booker: UserShort,
}

impl From<Booking> for BookingDetails {
    fn from(booking: Booking) -> Self {
        BookingDetails {
            id: booking.id,
            start_date: booking.start_date,
            end_date: booking.end_date,
            status: booking.status,
            item: ItemShort {
                id: booking.item_id,
                name: booking.item_name,
            },
            booker: UserShort {
                id: booking.booker_id,
                name: booking.booker_name,
            },
        }
    }
}

/// Reduced booking view attached to an item for its owner
#[derive(Debug, Clone, Serialize, FromRow, ToSchema)]
pub struct BookingBrief {
    pub id: i32,
    pub booker_id: i32,
    pub start_date: DateTime<Utc>,
    pub end_date: DateTime<Utc>,
}

/// Create booking request
#[derive(Debug, Deserialize, ToSchema)]
pub struct CreateBooking {
    pub start_date: DateTime<Utc>,
    pub end_date: DateTime<Utc>,
    pub item_id: i32,
}

/// Booking list query parameters
#[derive(Debug, Deserialize, IntoParams)]
pub struct BookingQuery {
    pub state: Option<BookingState>,
    pub from: Option<i64>,
    pub size: Option<i64>,
}

impl BookingQuery {
    /// Resolve defaults (`ALL`, `from=0`, `size=10`) and validate the page
    pub fn resolve(&self) -> AppResult<(BookingState, i64, i64)> {
        let from = self.from.unwrap_or(0);
        let size = self.size.unwrap_or(10);
        check_page(from, size)?;
        Ok((self.state.unwrap_or_default(), from, size))
    }
}

pub fn check_page(from: i64, size: i64) -> AppResult<()> {
    if from < 0 {
        return Err(AppError::Validation(format!(
            "Offset must not be negative, got {}",
            from
        )));
    }
    if size < 1 {
        return Err(AppError::Validation(format!(
            "Page size must be positive, got {}",
            size
        )));
    }
    Ok(())
}

/// Convert a zero-based offset into the offset of its containing page.
///
/// `from` is interpreted as a page index via `from / size`, so offsets that
/// are not an exact multiple of `size` round down to the page boundary.
/// Callers needing precise offsets must pass `from` as a multiple of
/// `size`; this arithmetic is part of the API contract and must not change.
pub fn page_offset(from: i64, size: i64) -> i64 {
    (from / size) * size
}
