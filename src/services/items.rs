//! Item catalog service: listing, editing, search, and comments

use chrono::Utc;

use crate::{
    error::{AppError, AppResult},
    models::comment::{CommentDetails, CreateComment},
    models::item::{CreateItem, Item, ItemDetails, UpdateItem},
    repository::Repository,
};

#[derive(Clone)]
pub struct ItemsService {
    repository: Repository,
}

impl ItemsService {
    pub fn new(repository: Repository) -> Self {
        Self { repository }
    }

    /// List a new item owned by the caller
    pub async fn create_item(&self, payload: CreateItem, caller_id: i32) -> AppResult<Item> {
        self.repository.users.get_by_id(caller_id).await?;
        if let Some(request_id) = payload.request_id {
            self.repository.requests.get_by_id(request_id).await?;
        }
        self.repository.items.create(caller_id, &payload).await
    }

    /// Edit an item. Only its owner may edit; anyone else gets the same
    /// "not found" a missing item would produce.
    pub async fn update_item(
        &self,
        item_id: i32,
        patch: UpdateItem,
        caller_id: i32,
    ) -> AppResult<Item> {
        let item = self.repository.items.get_by_id(item_id).await?;
        if item.owner_id != caller_id {
            return Err(AppError::NotFound(format!(
                "Item with id {} not found",
                item_id
            )));
        }
        self.repository.items.update(item_id, &patch).await
    }

    /// Get an item with its comments. The owner additionally sees the
    /// item's last and next bookings; other callers do not.
    pub async fn get_item(&self, item_id: i32, caller_id: i32) -> AppResult<ItemDetails> {
        let item = self.repository.items.get_by_id(item_id).await?;
        let comments = self.repository.comments.find_all_by_item(item_id).await?;

        if item.owner_id != caller_id {
            return Ok(ItemDetails::new(item, None, None, comments));
        }

        let now = Utc::now();
        let last_booking = self.repository.bookings.find_last_for_item(item_id, now).await?;
        let next_booking = self.repository.bookings.find_next_for_item(item_id, now).await?;
        Ok(ItemDetails::new(item, last_booking, next_booking, comments))
    }

    /// List the caller's items, each with its last and next booking
    pub async fn get_all_by_owner(&self, owner_id: i32) -> AppResult<Vec<ItemDetails>> {
        let items = self.repository.items.find_all_by_owner(owner_id).await?;

        let now = Utc::now();
        let mut last_bookings = self
            .repository
            .bookings
            .find_last_for_owner_items(owner_id, now)
            .await?;
        let mut next_bookings = self
            .repository
            .bookings
            .find_next_for_owner_items(owner_id, now)
            .await?;
        let item_ids: Vec<i32> = items.iter().map(|item| item.id).collect();
        let mut comments = self.repository.comments.find_all_by_items(&item_ids).await?;

        let mut details = Vec::with_capacity(items.len());
        for item in items {
            let last = last_bookings.remove(&item.id);
            let next = next_bookings.remove(&item.id);
            let item_comments = comments.remove(&item.id).unwrap_or_default();
            details.push(ItemDetails::new(item, last, next, item_comments));
        }
        Ok(details)
    }

    /// Free-text search over available items. Blank text short-circuits
    /// to an empty result without querying the store.
    pub async fn search(&self, text: &str) -> AppResult<Vec<Item>> {
        if text.trim().is_empty() {
            return Ok(Vec::new());
        }
        self.repository.items.search(text).await
    }

    /// Comment on an item. Allowed only after a booking by the caller on
    /// this item has ended.
    pub async fn add_comment(
        &self,
        item_id: i32,
        payload: CreateComment,
        caller_id: i32,
    ) -> AppResult<CommentDetails> {
        let now = Utc::now();
        let booking = self
            .repository
            .bookings
            .find_first_completed(item_id, caller_id, now)
            .await?
            .ok_or_else(|| {
                AppError::Validation(format!(
                    "Comments on item {} require a completed booking",
                    item_id
                ))
            })?;

        let comment_id = self
            .repository
            .comments
            .create(booking.item_id, booking.booker_id, &payload.text, now)
            .await?;

        Ok(CommentDetails {
            id: comment_id,
            text: payload.text,
            item_id: booking.item_id,
            author_name: booking.booker_name,
            created: now,
        })
    }
}
