//! Bookings repository for database operations.
//!
//! Every query that compares against the clock takes `now` as a parameter
//! so that one operation uses a single clock reading for all of its
//! comparisons. List queries are ordered by `start_date` descending and
//! paged with `LIMIT`/`OFFSET` computed by the caller.

use chrono::{DateTime, Utc};
use sqlx::{Pool, Postgres, Row};
use std::collections::HashMap;

use crate::{
    error::{AppError, AppResult},
    models::booking::{Booking, BookingBrief, BookingStatus},
};

#[derive(Clone)]
pub struct BookingsRepository {
    pool: Pool<Postgres>,
}

impl BookingsRepository {
    pub fn new(pool: Pool<Postgres>) -> Self {
        Self { pool }
    }

    /// Get a booking with its item and booker by ID
    pub async fn get_by_id(&self, id: i32) -> AppResult<Booking> {
        sqlx::query_as::<_, Booking>(
            r#"
            SELECT b.id, b.start_date, b.end_date, b.status,
                   b.item_id, i.name AS item_name, i.owner_id AS item_owner_id,
                   b.booker_id, u.name AS booker_name
            FROM bookings b
            JOIN items i ON b.item_id = i.id
            JOIN users u ON b.booker_id = u.id
            WHERE b.id = $1
            "#,
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await?
        .ok_or_else(|| AppError::NotFound(format!("Booking with id {} not found", id)))
    }

    /// Insert a new booking in WAITING status, returning its assigned ID
    pub async fn create(
        &self,
        item_id: i32,
        booker_id: i32,
        start_date: DateTime<Utc>,
        end_date: DateTime<Utc>,
    ) -> AppResult<i32> {
        let id = sqlx::query_scalar::<_, i32>(
            r#"
            INSERT INTO bookings (start_date, end_date, item_id, booker_id, status)
            VALUES ($1, $2, $3, $4, $5)
            RETURNING id
            "#,
        )
        .bind(start_date)
        .bind(end_date)
        .bind(item_id)
        .bind(booker_id)
        .bind(BookingStatus::Waiting)
        .fetch_one(&self.pool)
        .await?;
        Ok(id)
    }

    /// Move a WAITING booking to a terminal status.
    ///
    /// The status check is part of the UPDATE itself, so under concurrent
    /// approval calls at most one caller observes `true`; the storage row
    /// lock makes the check-then-set atomic.
    pub async fn set_status_if_waiting(&self, id: i32, status: BookingStatus) -> AppResult<bool> {
        let result = sqlx::query("UPDATE bookings SET status = $1 WHERE id = $2 AND status = $3")
            .bind(status)
            .bind(id)
            .bind(BookingStatus::Waiting)
            .execute(&self.pool)
            .await?;
        Ok(result.rows_affected() > 0)
    }

    /// All bookings made by a booker
    pub async fn find_all_by_booker(
        &self,
        booker_id: i32,
        limit: i64,
        offset: i64,
    ) -> AppResult<Vec<Booking>> {
        let bookings = sqlx::query_as::<_, Booking>(
            r#"
            SELECT b.id, b.start_date, b.end_date, b.status,
                   b.item_id, i.name AS item_name, i.owner_id AS item_owner_id,
                   b.booker_id, u.name AS booker_name
            FROM bookings b
            JOIN items i ON b.item_id = i.id
            JOIN users u ON b.booker_id = u.id
            WHERE b.booker_id = $1
            ORDER BY b.start_date DESC
            LIMIT $2 OFFSET $3
            "#,
        )
        .bind(booker_id)
        .bind(limit)
        .bind(offset)
        .fetch_all(&self.pool)
        .await?;
        Ok(bookings)
    }

    /// Bookings by a booker that ended strictly before `now`
    pub async fn find_by_booker_past(
        &self,
        booker_id: i32,
        now: DateTime<Utc>,
        limit: i64,
        offset: i64,
    ) -> AppResult<Vec<Booking>> {
        let bookings = sqlx::query_as::<_, Booking>(
            r#"
            SELECT b.id, b.start_date, b.end_date, b.status,
                   b.item_id, i.name AS item_name, i.owner_id AS item_owner_id,
                   b.booker_id, u.name AS booker_name
            FROM bookings b
            JOIN items i ON b.item_id = i.id
            JOIN users u ON b.booker_id = u.id
            WHERE b.booker_id = $1 AND b.end_date < $2
            ORDER BY b.start_date DESC
            LIMIT $3 OFFSET $4
            "#,
        )
        .bind(booker_id)
        .bind(now)
        .bind(limit)
        .bind(offset)
        .fetch_all(&self.pool)
        .await?;
        Ok(bookings)
    }

    /// Bookings by a booker that start strictly after `now`
    pub async fn find_by_booker_future(
        &self,
        booker_id: i32,
        now: DateTime<Utc>,
        limit: i64,
        offset: i64,
    ) -> AppResult<Vec<Booking>> {
        let bookings = sqlx::query_as::<_, Booking>(
            r#"
            SELECT b.id, b.start_date, b.end_date, b.status,
                   b.item_id, i.name AS item_name, i.owner_id AS item_owner_id,
                   b.booker_id, u.name AS booker_name
            FROM bookings b
            JOIN items i ON b.item_id = i.id
            JOIN users u ON b.booker_id = u.id
            WHERE b.booker_id = $1 AND b.start_date > $2
            ORDER BY b.start_date DESC
            LIMIT $3 OFFSET $4
            "#,
        )
        .bind(booker_id)
        .bind(now)
        .bind(limit)
        .bind(offset)
        .fetch_all(&self.pool)
        .await?;
        Ok(bookings)
    }

    /// Bookings by a booker whose window strictly brackets `now`.
    ///
    /// A booking starting or ending exactly at `now` is excluded.
    pub async fn find_by_booker_current(
        &self,
        booker_id: i32,
        now: DateTime<Utc>,
        limit: i64,
        offset: i64,
    ) -> AppResult<Vec<Booking>> {
        let bookings = sqlx::query_as::<_, Booking>(
            r#"
            SELECT b.id, b.start_date, b.end_date, b.status,
                   b.item_id, i.name AS item_name, i.owner_id AS item_owner_id,
                   b.booker_id, u.name AS booker_name
            FROM bookings b
            JOIN items i ON b.item_id = i.id
            JOIN users u ON b.booker_id = u.id
            WHERE b.booker_id = $1 AND b.start_date < $2 AND b.end_date > $2
            ORDER BY b.start_date DESC
            LIMIT $3 OFFSET $4
            "#,
        )
        .bind(booker_id)
        .bind(now)
        .bind(limit)
        .bind(offset)
        .fetch_all(&self.pool)
        .await?;
        Ok(bookings)
    }

    /// Bookings by a booker in an exact status
    pub async fn find_by_booker_status(
        &self,
        booker_id: i32,
        status: BookingStatus,
        limit: i64,
        offset: i64,
    ) -> AppResult<Vec<Booking>> {
        let bookings = sqlx::query_as::<_, Booking>(
            r#"
            SELECT b.id, b.start_date, b.end_date, b.status,
                   b.item_id, i.name AS item_name, i.owner_id AS item_owner_id,
                   b.booker_id, u.name AS booker_name
            FROM bookings b
            JOIN items i ON b.item_id = i.id
            JOIN users u ON b.booker_id = u.id
            WHERE b.booker_id = $1 AND b.status = $2
            ORDER BY b.start_date DESC
            LIMIT $3 OFFSET $4
            "#,
        )
        .bind(booker_id)
        .bind(status)
        .bind(limit)
        .bind(offset)
        .fetch_all(&self.pool)
        .await?;
        Ok(bookings)
    }

    /// All bookings across an owner's items
    pub async fn find_all_by_item_owner(
        &self,
        owner_id: i32,
        limit: i64,
        offset: i64,
    ) -> AppResult<Vec<Booking>> {
        let bookings = sqlx::query_as::<_, Booking>(
            r#"
            SELECT b.id, b.start_date, b.end_date, b.status,
                   b.item_id, i.name AS item_name, i.owner_id AS item_owner_id,
                   b.booker_id, u.name AS booker_name
            FROM bookings b
            JOIN items i ON b.item_id = i.id
            JOIN users u ON b.booker_id = u.id
            WHERE i.owner_id = $1
            ORDER BY b.start_date DESC
            LIMIT $2 OFFSET $3
            "#,
        )
        .bind(owner_id)
        .bind(limit)
        .bind(offset)
        .fetch_all(&self.pool)
        .await?;
        Ok(bookings)
    }

    /// Bookings on an owner's items that ended strictly before `now`
    pub async fn find_by_item_owner_past(
        &self,
        owner_id: i32,
        now: DateTime<Utc>,
        limit: i64,
        offset: i64,
    ) -> AppResult<Vec<Booking>> {
        let bookings = sqlx::query_as::<_, Booking>(
            r#"
            SELECT b.id, b.start_date, b.end_date, b.status,
                   b.item_id, i.name AS item_name, i.owner_id AS item_owner_id,
                   b.booker_id, u.name AS booker_name
            FROM bookings b
            JOIN items i ON b.item_id = i.id
            JOIN users u ON b.booker_id = u.id
            WHERE i.owner_id = $1 AND b.end_date < $2
            ORDER BY b.start_date DESC
            LIMIT $3 OFFSET $4
            "#,
        )
        .bind(owner_id)
        .bind(now)
        .bind(limit)
        .bind(offset)
        .fetch_all(&self.pool)
        .await?;
        Ok(bookings)
    }

    /// Bookings on an owner's items that start strictly after `now`
    pub async fn find_by_item_owner_future(
        &self,
        owner_id: i32,
        now: DateTime<Utc>,
        limit: i64,
        offset: i64,
    ) -> AppResult<Vec<Booking>> {
        let bookings = sqlx::query_as::<_, Booking>(
            r#"
            SELECT b.id, b.start_date, b.end_date, b.status,
                   b.item_id, i.name AS item_name, i.owner_id AS item_owner_id,
                   b.booker_id, u.name AS booker_name
            FROM bookings b
            JOIN items i ON b.item_id = i.id
            JOIN users u ON b.booker_id = u.id
            WHERE i.owner_id = $1 AND b.start_date > $2
            ORDER BY b.start_date DESC
            LIMIT $3 OFFSET $4
            "#,
        )
        .bind(owner_id)
        .bind(now)
        .bind(limit)
        .bind(offset)
        .fetch_all(&self.pool)
        .await?;
        Ok(bookings)
    }

    /// Bookings on an owner's items whose window strictly brackets `now`
    pub async fn find_by_item_owner_current(
        &self,
        owner_id: i32,
        now: DateTime<Utc>,
        limit: i64,
        offset: i64,
    ) -> AppResult<Vec<Booking>> {
        let bookings = sqlx::query_as::<_, Booking>(
            r#"
            SELECT b.id, b.start_date, b.end_date, b.status,
                   b.item_id, i.name AS item_name, i.owner_id AS item_owner_id,
                   b.booker_id, u.name AS booker_name
            FROM bookings b
            JOIN items i ON b.item_id = i.id
            JOIN users u ON b.booker_id = u.id
            WHERE i.owner_id = $1 AND b.start_date < $2 AND b.end_date > $2
            ORDER BY b.start_date DESC
            LIMIT $3 OFFSET $4
            "#,
        )
        .bind(owner_id)
        .bind(now)
        .bind(limit)
        .bind(offset)
        .fetch_all(&self.pool)
        .await?;
        Ok(bookings)
    }

    /// Bookings on an owner's items in an exact status
    pub async fn find_by_item_owner_status(
        &self,
        owner_id: i32,
        status: BookingStatus,
        limit: i64,
        offset: i64,
    ) -> AppResult<Vec<Booking>> {
        let bookings = sqlx::query_as::<_, Booking>(
            r#"
            SELECT b.id, b.start_date, b.end_date, b.status,
                   b.item_id, i.name AS item_name, i.owner_id AS item_owner_id,
                   b.booker_id, u.name AS booker_name
            FROM bookings b
            JOIN items i ON b.item_id = i.id
            JOIN users u ON b.booker_id = u.id
            WHERE i.owner_id = $1 AND b.status = $2
            ORDER BY b.start_date DESC
            LIMIT $3 OFFSET $4
            "#,
        )
        .bind(owner_id)
        .bind(status)
        .bind(limit)
        .bind(offset)
        .fetch_all(&self.pool)
        .await?;
        Ok(bookings)
    }

    /// Latest started booking of an item (owner's item view)
    pub async fn find_last_for_item(
        &self,
        item_id: i32,
        now: DateTime<Utc>,
    ) -> AppResult<Option<BookingBrief>> {
        let booking = sqlx::query_as::<_, BookingBrief>(
            r#"
            SELECT id, booker_id, start_date, end_date
            FROM bookings
            WHERE item_id = $1 AND start_date < $2
            ORDER BY end_date DESC
            LIMIT 1
            "#,
        )
        .bind(item_id)
        .bind(now)
        .fetch_optional(&self.pool)
        .await?;
        Ok(booking)
    }

    /// Next upcoming non-rejected booking of an item (owner's item view)
    pub async fn find_next_for_item(
        &self,
        item_id: i32,
        now: DateTime<Utc>,
    ) -> AppResult<Option<BookingBrief>> {
        let booking = sqlx::query_as::<_, BookingBrief>(
            r#"
            SELECT id, booker_id, start_date, end_date
            FROM bookings
            WHERE item_id = $1 AND start_date > $2 AND status != $3
            ORDER BY start_date
            LIMIT 1
            "#,
        )
        .bind(item_id)
        .bind(now)
        .bind(BookingStatus::Rejected)
        .fetch_optional(&self.pool)
        .await?;
        Ok(booking)
    }

    /// Latest started booking per item across an owner's items, keyed by item
    pub async fn find_last_for_owner_items(
        &self,
        owner_id: i32,
        now: DateTime<Utc>,
    ) -> AppResult<HashMap<i32, BookingBrief>> {
        let rows = sqlx::query(
            r#"
            SELECT DISTINCT ON (b.item_id)
                   b.item_id, b.id, b.booker_id, b.start_date, b.end_date
            FROM bookings b
            JOIN items i ON b.item_id = i.id
            WHERE i.owner_id = $1 AND b.start_date < $2
            ORDER BY b.item_id, b.end_date DESC
            "#,
        )
        .bind(owner_id)
        .bind(now)
        .fetch_all(&self.pool)
        .await?;

        let mut bookings = HashMap::new();
        for row in rows {
            bookings.insert(
                row.get("item_id"),
                BookingBrief {
                    id: row.get("id"),
                    booker_id: row.get("booker_id"),
                    start_date: row.get("start_date"),
                    end_date: row.get("end_date"),
                },
            );
        }
        Ok(bookings)
    }

    /// Next upcoming non-rejected booking per item across an owner's items
    pub async fn find_next_for_owner_items(
        &self,
        owner_id: i32,
        now: DateTime<Utc>,
    ) -> AppResult<HashMap<i32, BookingBrief>> {
        let rows = sqlx::query(
            r#"
            SELECT DISTINCT ON (b.item_id)
                   b.item_id, b.id, b.booker_id, b.start_date, b.end_date
            FROM bookings b
            JOIN items i ON b.item_id = i.id
            WHERE i.owner_id = $1 AND b.start_date > $2 AND b.status != $3
            ORDER BY b.item_id, b.start_date
            "#,
        )
        .bind(owner_id)
        .bind(now)
        .bind(BookingStatus::Rejected)
        .fetch_all(&self.pool)
        .await?;

        let mut bookings = HashMap::new();
        for row in rows {
            bookings.insert(
                row.get("item_id"),
                BookingBrief {
                    id: row.get("id"),
                    booker_id: row.get("booker_id"),
                    start_date: row.get("start_date"),
                    end_date: row.get("end_date"),
                },
            );
        }
        Ok(bookings)
    }

    /// Any booking of an item by a booker that ended strictly before `now`.
    ///
    /// Proof of a completed borrow; used to gate comment creation.
    pub async fn find_first_completed(
        &self,
        item_id: i32,
        booker_id: i32,
        now: DateTime<Utc>,
    ) -> AppResult<Option<Booking>> {
        let booking = sqlx::query_as::<_, Booking>(
            r#"
            SELECT b.id, b.start_date, b.end_date, b.status,
                   b.item_id, i.name AS item_name, i.owner_id AS item_owner_id,
                   b.booker_id, u.name AS booker_name
            FROM bookings b
            JOIN items i ON b.item_id = i.id
            JOIN users u ON b.booker_id = u.id
            WHERE b.item_id = $1 AND b.booker_id = $2 AND b.end_date < $3
            LIMIT 1
            "#,
        )
        .bind(item_id)
        .bind(booker_id)
        .bind(now)
        .fetch_optional(&self.pool)
        .await?;
        Ok(booking)
    }
}
