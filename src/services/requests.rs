//! Item request (bulletin board) service

use chrono::Utc;
use std::collections::HashMap;

use crate::{
    error::{AppError, AppResult},
    models::booking::page_offset,
    models::item::Item,
    models::request::{CreateRequest, ItemRequest, RequestDetails},
    repository::Repository,
};

#[derive(Clone)]
pub struct RequestsService {
    repository: Repository,
}

impl RequestsService {
    pub fn new(repository: Repository) -> Self {
        Self { repository }
    }

    /// Post an open request for an item not yet listed
    pub async fn create_request(
        &self,
        payload: CreateRequest,
        caller_id: i32,
    ) -> AppResult<ItemRequest> {
        self.repository.users.get_by_id(caller_id).await?;
        self.repository
            .requests
            .create(caller_id, &payload.description, Utc::now())
            .await
    }

    /// The caller's own requests, oldest first, with answering items
    pub async fn get_own_requests(&self, caller_id: i32) -> AppResult<Vec<RequestDetails>> {
        self.check_user(caller_id).await?;
        let requests = self.repository.requests.find_all_by_requester(caller_id).await?;
        self.with_items(requests).await
    }

    /// Requests posted by other users, oldest first, paged
    pub async fn get_other_requests(
        &self,
        caller_id: i32,
        from: i64,
        size: i64,
    ) -> AppResult<Vec<RequestDetails>> {
        self.check_user(caller_id).await?;
        let requests = self
            .repository
            .requests
            .find_all_by_other_requesters(caller_id, size, page_offset(from, size))
            .await?;
        self.with_items(requests).await
    }

    /// A single request with its answering items
    pub async fn get_request(&self, request_id: i32, caller_id: i32) -> AppResult<RequestDetails> {
        self.check_user(caller_id).await?;
        let request = self.repository.requests.get_by_id(request_id).await?;
        let items = self.repository.items.find_by_request_ids(&[request_id]).await?;
        Ok(RequestDetails::new(request, items))
    }

    async fn check_user(&self, user_id: i32) -> AppResult<()> {
        if !self.repository.users.exists(user_id).await? {
            return Err(AppError::NotFound(format!(
                "User with id {} not found",
                user_id
            )));
        }
        Ok(())
    }

    /// Attach answering items to each request with one bulk query
    async fn with_items(&self, requests: Vec<ItemRequest>) -> AppResult<Vec<RequestDetails>> {
        let ids: Vec<i32> = requests.iter().map(|r| r.id).collect();
        let mut by_request: HashMap<i32, Vec<Item>> = HashMap::new();
        if !ids.is_empty() {
            for item in self.repository.items.find_by_request_ids(&ids).await? {
                if let Some(request_id) = item.request_id {
                    by_request.entry(request_id).or_default().push(item);
                }
            }
        }
        Ok(requests
            .into_iter()
            .map(|request| {
                let items = by_request.remove(&request.id).unwrap_or_default();
                RequestDetails::new(request, items)
            })
            .collect())
    }
}
