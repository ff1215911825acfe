//! Comments repository for database operations

use chrono::{DateTime, Utc};
use sqlx::{Pool, Postgres};
use std::collections::HashMap;

use crate::{error::AppResult, models::comment::CommentDetails};

#[derive(Clone)]
pub struct CommentsRepository {
    pool: Pool<Postgres>,
}

impl CommentsRepository {
    pub fn new(pool: Pool<Postgres>) -> Self {
        Self { pool }
    }

    /// Insert a new comment, returning its assigned ID
    pub async fn create(
        &self,
        item_id: i32,
        author_id: i32,
        text: &str,
        created: DateTime<Utc>,
    ) -> AppResult<i32> {
        let id = sqlx::query_scalar::<_, i32>(
            r#"
            INSERT INTO comments (text, item_id, author_id, created)
            VALUES ($1, $2, $3, $4)
            RETURNING id
            "#,
        )
        .bind(text)
        .bind(item_id)
        .bind(author_id)
        .bind(created)
        .fetch_one(&self.pool)
        .await?;
        Ok(id)
    }

    /// Comments across several items, oldest first, keyed by item
    pub async fn find_all_by_items(
        &self,
        item_ids: &[i32],
    ) -> AppResult<HashMap<i32, Vec<CommentDetails>>> {
        let comments = sqlx::query_as::<_, CommentDetails>(
            r#"
            SELECT c.id, c.text, c.item_id, u.name AS author_name, c.created
            FROM comments c
            JOIN users u ON c.author_id = u.id
            WHERE c.item_id = ANY($1)
            ORDER BY c.created
            "#,
        )
        .bind(item_ids)
        .fetch_all(&self.pool)
        .await?;

        let mut by_item: HashMap<i32, Vec<CommentDetails>> = HashMap::new();
        for comment in comments {
            by_item.entry(comment.item_id).or_default().push(comment);
        }
        Ok(by_item)
    }

    /// Comments on an item, oldest first, with author names
    pub async fn find_all_by_item(&self, item_id: i32) -> AppResult<Vec<CommentDetails>> {
        let comments = sqlx::query_as::<_, CommentDetails>(
            r#"
            SELECT c.id, c.text, c.item_id, u.name AS author_name, c.created
            FROM comments c
            JOIN users u ON c.author_id = u.id
            WHERE c.item_id = $1
            ORDER BY c.created
            "#,
        )
        .bind(item_id)
        .fetch_all(&self.pool)
        .await?;
        Ok(comments)
    }
}
