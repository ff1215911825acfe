//! User management service

use crate::{
    error::{AppError, AppResult},
    models::user::{CreateUser, UpdateUser, User},
    repository::Repository,
};

#[derive(Clone)]
pub struct UsersService {
    repository: Repository,
}

impl UsersService {
    pub fn new(repository: Repository) -> Self {
        Self { repository }
    }

    /// Register a new user. Emails are unique across users.
    pub async fn create_user(&self, payload: CreateUser) -> AppResult<User> {
        if self.repository.users.email_exists(&payload.email, None).await? {
            return Err(AppError::Conflict(format!(
                "Email {} is already in use",
                payload.email
            )));
        }
        self.repository.users.create(&payload.name, &payload.email).await
    }

    /// Get a user by ID
    pub async fn get_by_id(&self, user_id: i32) -> AppResult<User> {
        self.repository.users.get_by_id(user_id).await
    }

    /// Partially update a user's name and/or email
    pub async fn update_user(&self, user_id: i32, payload: UpdateUser) -> AppResult<User> {
        let user = self.repository.users.get_by_id(user_id).await?;

        if let Some(ref email) = payload.email {
            if !email.eq_ignore_ascii_case(&user.email)
                && self.repository.users.email_exists(email, Some(user_id)).await?
            {
                return Err(AppError::Conflict(format!(
                    "Email {} is already in use",
                    email
                )));
            }
        }

        self.repository
            .users
            .update(user_id, payload.name.as_deref(), payload.email.as_deref())
            .await
    }

    /// Delete a user
    pub async fn delete_user(&self, user_id: i32) -> AppResult<()> {
        self.repository.users.delete(user_id).await
    }

    /// List all users
    pub async fn get_all(&self) -> AppResult<Vec<User>> {
        self.repository.users.find_all().await
    }
}
