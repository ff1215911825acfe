//! Booking lifecycle service.
//!
//! Owns the WAITING -> APPROVED/REJECTED state machine and the
//! authorization-scoped reads around it. Authorization failures are
//! reported as "not found" on purpose: a caller probing someone else's
//! booking, or an owner's own item, learns nothing from the response that
//! a missing id would not also produce.

use chrono::{DateTime, Utc};

use crate::{
    error::{AppError, AppResult},
    models::booking::{page_offset, BookingDetails, BookingState, BookingStatus, CreateBooking},
    repository::Repository,
};

#[derive(Clone)]
pub struct BookingsService {
    repository: Repository,
}

impl BookingsService {
    pub fn new(repository: Repository) -> Self {
        Self { repository }
    }

    /// Book an item for a time window.
    ///
    /// All checks run before the insert, so a rejected request leaves no
    /// trace in the store. Creating a booking does not touch the item's
    /// availability flag.
    pub async fn create_booking(
        &self,
        payload: CreateBooking,
        caller_id: i32,
    ) -> AppResult<BookingDetails> {
        let now = Utc::now();
        check_booking_window(payload.start_date, payload.end_date, now)?;

        let item = self.repository.items.get_by_id(payload.item_id).await?;
        if !item.available {
            return Err(AppError::Validation(format!(
                "Item {} is not available for booking",
                item.id
            )));
        }
        // An owner booking their own item gets the same answer as an
        // unavailable item, without disclosing that they hit the ownership
        // rule.
        if item.owner_id == caller_id {
            return Err(AppError::NotFound(format!(
                "Item {} is not available for booking",
                item.id
            )));
        }

        self.repository.users.get_by_id(caller_id).await?;

        let booking_id = self
            .repository
            .bookings
            .create(item.id, caller_id, payload.start_date, payload.end_date)
            .await?;

        tracing::info!(
            "user {} booked item {} as booking {}",
            caller_id,
            item.id,
            booking_id
        );

        let booking = self.repository.bookings.get_by_id(booking_id).await?;
        Ok(BookingDetails::from(booking))
    }

    /// Decide a waiting booking. Only the item's owner may decide, and
    /// only once; the decision is terminal.
    pub async fn approve_booking(
        &self,
        booking_id: i32,
        approved: bool,
        caller_id: i32,
    ) -> AppResult<BookingDetails> {
        let mut booking = self.repository.bookings.get_by_id(booking_id).await?;
        if booking.item_owner_id != caller_id {
            return Err(AppError::NotFound(format!(
                "Booking with id {} not found",
                booking_id
            )));
        }
        if booking.status != BookingStatus::Waiting {
            return Err(AppError::Validation(format!(
                "Booking {} is not awaiting a decision",
                booking_id
            )));
        }

        let status = if approved {
            BookingStatus::Approved
        } else {
            BookingStatus::Rejected
        };

        // The conditional update arbitrates concurrent decisions; a lost
        // race reports the same error as an already-decided booking.
        let updated = self
            .repository
            .bookings
            .set_status_if_waiting(booking_id, status)
            .await?;
        if !updated {
            return Err(AppError::Validation(format!(
                "Booking {} is not awaiting a decision",
                booking_id
            )));
        }

        tracing::info!("booking {} decided: {}", booking_id, status);

        booking.status = status;
        Ok(BookingDetails::from(booking))
    }

    /// Get a booking, visible only to its booker and the item's owner.
    ///
    /// Non-participants get the same "not found" as a missing id.
    pub async fn get_booking(&self, booking_id: i32, caller_id: i32) -> AppResult<BookingDetails> {
        let booking = self.repository.bookings.get_by_id(booking_id).await?;
        if booking.booker_id != caller_id && booking.item_owner_id != caller_id {
            return Err(AppError::NotFound(format!(
                "Booking with id {} not found",
                booking_id
            )));
        }
        Ok(BookingDetails::from(booking))
    }

    /// List a booker's bookings filtered by state, newest start first.
    pub async fn list_by_booker(
        &self,
        user_id: i32,
        state: BookingState,
        from: i64,
        size: i64,
    ) -> AppResult<Vec<BookingDetails>> {
        if !self.repository.users.exists(user_id).await? {
            return Err(AppError::NotFound(format!(
                "User with id {} not found",
                user_id
            )));
        }

        let now = Utc::now();
        let (limit, offset) = (size, page_offset(from, size));
        let bookings = match state {
            BookingState::All => {
                self.repository
                    .bookings
                    .find_all_by_booker(user_id, limit, offset)
                    .await?
            }
            BookingState::Past => {
                self.repository
                    .bookings
                    .find_by_booker_past(user_id, now, limit, offset)
                    .await?
            }
            BookingState::Future => {
                self.repository
                    .bookings
                    .find_by_booker_future(user_id, now, limit, offset)
                    .await?
            }
            BookingState::Current => {
                self.repository
                    .bookings
                    .find_by_booker_current(user_id, now, limit, offset)
                    .await?
            }
            BookingState::Waiting => {
                self.repository
                    .bookings
                    .find_by_booker_status(user_id, BookingStatus::Waiting, limit, offset)
                    .await?
            }
            BookingState::Rejected => {
                self.repository
                    .bookings
                    .find_by_booker_status(user_id, BookingStatus::Rejected, limit, offset)
                    .await?
            }
        };

        Ok(bookings.into_iter().map(BookingDetails::from).collect())
    }

    /// List bookings across an owner's items filtered by state, newest
    /// start first.
    pub async fn list_by_item_owner(
        &self,
        owner_id: i32,
        state: BookingState,
        from: i64,
        size: i64,
    ) -> AppResult<Vec<BookingDetails>> {
        if !self.repository.users.exists(owner_id).await? {
            return Err(AppError::NotFound(format!(
                "User with id {} not found",
                owner_id
            )));
        }

        let now = Utc::now();
        let (limit, offset) = (size, page_offset(from, size));
        let bookings = match state {
            BookingState::Past => {
                self.repository
                    .bookings
                    .find_by_item_owner_past(owner_id, now, limit, offset)
                    .await?
            }
            BookingState::Future => {
                self.repository
                    .bookings
                    .find_by_item_owner_future(owner_id, now, limit, offset)
                    .await?
            }
            BookingState::Current => {
                self.repository
                    .bookings
                    .find_by_item_owner_current(owner_id, now, limit, offset)
                    .await?
            }
            BookingState::Waiting => {
                self.repository
                    .bookings
                    .find_by_item_owner_status(owner_id, BookingStatus::Waiting, limit, offset)
                    .await?
            }
            BookingState::Rejected => {
                self.repository
                    .bookings
                    .find_by_item_owner_status(owner_id, BookingStatus::Rejected, limit, offset)
                    .await?
            }
            // ALL and anything unmatched fall back to the unfiltered
            // owner listing
            BookingState::All => {
                self.repository
                    .bookings
                    .find_all_by_item_owner(owner_id, limit, offset)
                    .await?
            }
        };

        Ok(bookings.into_iter().map(BookingDetails::from).collect())
    }
}

/// Validate a requested booking window against the clock.
///
/// The start may equal `now` but must not precede it; the end must be
/// strictly after the start. Both comparisons use the single `now` the
/// caller read at the top of the operation.
pub fn check_booking_window(
    start: DateTime<Utc>,
    end: DateTime<Utc>,
    now: DateTime<Utc>,
) -> AppResult<()> {
    if start < now {
        return Err(AppError::Validation(format!(
            "Start date {} is in the past, server time is {}",
            start, now
        )));
    }
    if end <= start {
        return Err(AppError::Validation(format!(
            "End date {} must be after start date {}",
            end, start
        )));
    }
    Ok(())
}
